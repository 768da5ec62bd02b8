//! launchd LaunchAgent for the current user

use std::path::{Path, PathBuf};

use plist::{Dictionary, Value};

use super::write_file_atomic;
use crate::error::AutostartError;

pub(super) const LABEL: &str = "com.example.backup";

pub(super) fn generate_plist(exe: &Path) -> Result<Vec<u8>, AutostartError> {
    let mut agent = Dictionary::new();
    agent.insert("Label".to_string(), Value::String(LABEL.to_string()));
    agent.insert(
        "ProgramArguments".to_string(),
        Value::Array(vec![Value::String(exe.to_string_lossy().into_owned())]),
    );
    agent.insert("RunAtLoad".to_string(), Value::Boolean(true));

    let mut buf = Vec::new();
    plist::to_writer_xml(&mut buf, &Value::Dictionary(agent))
        .map_err(|e| AutostartError::Plist(e.to_string()))?;
    Ok(buf)
}

/// Write `~/Library/LaunchAgents/com.example.backup.plist`
pub(super) fn install(home: &Path, exe: &Path) -> Result<PathBuf, AutostartError> {
    let path = home
        .join("Library")
        .join("LaunchAgents")
        .join(format!("{LABEL}.plist"));
    write_file_atomic(&path, &generate_plist(exe)?)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_runs_at_load() {
        let xml = String::from_utf8(generate_plist(Path::new("/Applications/resticup")).unwrap()).unwrap();

        assert!(xml.contains("<string>com.example.backup</string>"));
        assert!(xml.contains("<string>/Applications/resticup</string>"));
        assert!(xml.contains("<key>RunAtLoad</key>"));
    }

    #[test]
    fn install_lands_in_launch_agents() {
        let home = tempfile::tempdir().unwrap();

        let path = install(home.path(), Path::new("/Applications/resticup")).unwrap();

        assert_eq!(
            path,
            home.path().join("Library/LaunchAgents/com.example.backup.plist")
        );
        let value = plist::Value::from_file(&path).unwrap();
        let dict = value.as_dictionary().unwrap();
        assert_eq!(dict.get("RunAtLoad").and_then(Value::as_boolean), Some(true));
    }
}
