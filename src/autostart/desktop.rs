//! XDG autostart desktop entry

use std::path::{Path, PathBuf};

use super::{ENTRY_NAME, write_file_atomic};
use crate::error::AutostartError;

pub(super) fn desktop_entry(exe: &Path) -> String {
    format!(
        "[Desktop Entry]\n\
         Type=Application\n\
         Exec={}\n\
         Hidden=false\n\
         NoDisplay=false\n\
         X-GNOME-Autostart-enabled=true\n\
         Name={ENTRY_NAME}\n\
         Comment=Backup program\n",
        exe.display()
    )
}

/// Write `<config_dir>/autostart/backup.desktop`
pub(super) fn install(config_dir: &Path, exe: &Path) -> Result<PathBuf, AutostartError> {
    let path = config_dir
        .join("autostart")
        .join(format!("{ENTRY_NAME}.desktop"));
    write_file_atomic(&path, desktop_entry(exe).as_bytes())?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_runs_the_executable_at_login() {
        let entry = desktop_entry(Path::new("/opt/backup/resticup"));

        assert!(entry.starts_with("[Desktop Entry]\n"));
        assert!(entry.contains("\nExec=/opt/backup/resticup\n"));
        assert!(entry.contains("\nX-GNOME-Autostart-enabled=true\n"));
        assert!(entry.contains("\nName=backup\n"));
    }

    #[test]
    fn install_creates_the_autostart_dir() {
        let dir = tempfile::tempdir().unwrap();
        let exe = Path::new("/opt/backup/resticup");

        let path = install(dir.path(), exe).unwrap();

        assert_eq!(path, dir.path().join("autostart").join("backup.desktop"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), desktop_entry(exe));
    }

    #[test]
    fn install_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let exe = Path::new("/opt/backup/resticup");

        let first = install(dir.path(), exe).unwrap();
        let second = install(dir.path(), exe).unwrap();

        assert_eq!(first, second);
        let entries = std::fs::read_dir(dir.path().join("autostart")).unwrap().count();
        assert_eq!(entries, 1);
    }
}
