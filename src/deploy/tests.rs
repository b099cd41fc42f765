use super::*;
use chrono::TimeZone;
use tempfile::{tempdir, TempDir};

fn docservice() -> ServiceSpec {
    ServiceSpec::new("docservice", "DocService", "docservice", "DocService", &[], "")
}

fn fixed_time() -> DateTime<Local> {
    Local.with_ymd_and_hms(2024, 1, 15, 15, 30, 45).unwrap()
}

fn backups_in(dir: &Path) -> Vec<PathBuf> {
    let mut backups: Vec<_> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.to_string_lossy().contains(".backup."))
        .collect();
    backups.sort();
    backups
}

/// Target dir containing `DocService/`, plus a packaged artifact elsewhere
fn setup(artifact_content: &str) -> (TempDir, TempDir, PathBuf) {
    let target = tempdir().unwrap();
    fs::create_dir(target.path().join("DocService")).unwrap();
    let build = tempdir().unwrap();
    let artifact = build.path().join("docservice");
    fs::write(&artifact, artifact_content).unwrap();
    (target, build, artifact)
}

#[test]
fn test_backup_path_format() {
    let path = backup_path(Path::new("/srv/DocService/docservice"), &fixed_time());
    assert_eq!(
        path,
        PathBuf::from("/srv/DocService/docservice.backup.20240115_153045")
    );
}

#[test]
fn test_create_backup_missing_file() {
    let dir = tempdir().unwrap();
    let result = create_backup(&dir.path().join("absent"), &fixed_time()).unwrap();
    assert!(result.is_none());
    assert!(backups_in(dir.path()).is_empty());
}

#[test]
fn test_deploy_fresh_destination() {
    let (target, _build, artifact) = setup("new build");
    let deployer = Deployer::new(target.path());

    let deployment = deployer.deploy(&docservice(), &artifact).unwrap();

    assert_eq!(
        deployment.destination,
        target.path().join("DocService").join("docservice")
    );
    assert!(deployment.backup.is_none());
    assert_eq!(fs::read_to_string(&deployment.destination).unwrap(), "new build");
    assert!(backups_in(&target.path().join("DocService")).is_empty());
}

#[test]
fn test_deploy_over_existing_creates_one_backup() {
    let (target, _build, artifact) = setup("new build");
    let subdir = target.path().join("DocService");
    fs::write(subdir.join("docservice"), "old build").unwrap();

    let deployment = Deployer::new(target.path())
        .deploy_at(&docservice(), &artifact, &fixed_time())
        .unwrap();

    let backups = backups_in(&subdir);
    assert_eq!(backups, vec![subdir.join("docservice.backup.20240115_153045")]);
    assert_eq!(deployment.backup, Some(backups[0].clone()));
    assert_eq!(fs::read_to_string(&backups[0]).unwrap(), "old build");
    assert_eq!(fs::read_to_string(&deployment.destination).unwrap(), "new build");

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = fs::metadata(&deployment.destination)
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o755);
    }
}

#[test]
fn test_deploys_within_same_second_share_backup_name() {
    let (target, build, artifact) = setup("second build");
    let subdir = target.path().join("DocService");
    fs::write(subdir.join("docservice"), "first build").unwrap();
    let deployer = Deployer::new(target.path());

    deployer
        .deploy_at(&docservice(), &artifact, &fixed_time())
        .unwrap();
    let third = build.path().join("third");
    fs::write(&third, "third build").unwrap();
    deployer
        .deploy_at(&docservice(), &third, &fixed_time())
        .unwrap();

    let backups = backups_in(&subdir);
    assert_eq!(backups.len(), 1);
    assert_eq!(fs::read_to_string(&backups[0]).unwrap(), "second build");
    assert_eq!(
        fs::read_to_string(subdir.join("docservice")).unwrap(),
        "third build"
    );
}

#[test]
fn test_deploy_missing_target_subdir() {
    let target = tempdir().unwrap();
    let build = tempdir().unwrap();
    let artifact = build.path().join("docservice");
    fs::write(&artifact, "bin").unwrap();

    let result = Deployer::new(target.path()).deploy(&docservice(), &artifact);
    match result {
        Err(DeployError::MissingTargetDir(path)) => {
            assert_eq!(path, target.path().join("DocService"));
        }
        other => panic!("expected missing target dir, got {:?}", other),
    }
    assert!(!target.path().join("DocService").exists());
}

#[test]
fn test_deploy_missing_artifact() {
    let (target, build, _artifact) = setup("bin");
    let result = Deployer::new(target.path()).deploy(&docservice(), &build.path().join("nope"));
    assert!(matches!(result, Err(DeployError::MissingArtifact(_))));
}

#[test]
fn test_deploy_onto_itself_is_rejected() {
    let target = tempdir().unwrap();
    let subdir = target.path().join("DocService");
    fs::create_dir(&subdir).unwrap();
    let destination = subdir.join("docservice");
    fs::write(&destination, "bin").unwrap();

    let result = Deployer::new(target.path()).deploy(&docservice(), &destination);
    assert!(matches!(result, Err(DeployError::SameFile(_))));
    assert_eq!(fs::read_to_string(&destination).unwrap(), "bin");
    assert!(backups_in(&subdir).is_empty());
}

#[test]
fn test_copy_preserves_modification_time() {
    let dir = tempdir().unwrap();
    let from = dir.path().join("from");
    let to = dir.path().join("to");
    fs::write(&from, "data").unwrap();
    let mtime = FileTime::from_unix_time(1_700_000_000, 0);
    filetime::set_file_mtime(&from, mtime).unwrap();

    copy_preserving_times(&from, &to).unwrap();

    let copied = FileTime::from_last_modification_time(&fs::metadata(&to).unwrap());
    assert_eq!(copied, mtime);
}

#[test]
fn test_io_error_message_names_cause_once() {
    let err = DeployError::Backup {
        path: PathBuf::from("/srv/DocService/docservice"),
        source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
    };
    assert_eq!(err.to_string(), "failed to back up /srv/DocService/docservice");

    let rendered = format!("{:#}", anyhow::Error::new(err));
    assert_eq!(rendered.matches("denied").count(), 1, "{}", rendered);
}
