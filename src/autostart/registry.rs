//! `HKCU\...\Run` value via `reg add`

use std::path::Path;
use std::process::Command;

use log::debug;

use super::{ENTRY_NAME, Registration};
use crate::error::AutostartError;

pub(super) const RUN_KEY: &str = r"HKCU\Software\Microsoft\Windows\CurrentVersion\Run";

pub(super) fn install(exe: &Path) -> Result<Registration, AutostartError> {
    debug!("reg add {RUN_KEY} /v {ENTRY_NAME}");
    let status = Command::new("reg")
        .args(["add", RUN_KEY, "/v", ENTRY_NAME, "/t", "REG_SZ", "/d"])
        .arg(exe)
        .arg("/f")
        .status()
        .map_err(|e| AutostartError::Registry(e.to_string()))?;

    if !status.success() {
        return Err(AutostartError::Registry(status.to_string()));
    }

    Ok(Registration::RegistryValue {
        key: RUN_KEY,
        value: ENTRY_NAME,
    })
}
