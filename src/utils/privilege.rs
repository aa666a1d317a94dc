//! Root check before touching GPIO and privilege drop once the panel is set up

use log::info;
use std::io::{self, Error, ErrorKind};
use uzers::switch::{set_both_gid, set_both_uid};
use uzers::{get_current_uid, get_user_by_name};

/// Users tried, in order, when giving up root
const UNPRIVILEGED_USERS: [&str; 2] = ["daemon", "nobody"];

/// GPIO access needs root
pub fn check_root_privileges() -> Result<(), String> {
    if get_current_uid() != 0 {
        return Err("This program must be run as root (sudo) to access the GPIO pins".to_string());
    }
    info!("Running with root privileges");
    Ok(())
}

fn clear_supplementary_groups() -> io::Result<()> {
    // SAFETY: an empty group list with a null pointer is valid for setgroups
    let result = unsafe { libc::setgroups(0, std::ptr::null()) };
    if result != 0 {
        return Err(Error::last_os_error());
    }
    Ok(())
}

fn permission_denied(what: &str, e: impl std::fmt::Display) -> Error {
    Error::new(ErrorKind::PermissionDenied, format!("{}: {}", what, e))
}

/// Switch to an unprivileged user. A no-op when the LED library already did.
pub fn drop_privileges() -> io::Result<()> {
    let current_uid = get_current_uid();
    if current_uid != 0 {
        info!("Privileges already dropped by led driver (current uid={})", current_uid);
        return Ok(());
    }

    let user = UNPRIVILEGED_USERS
        .iter()
        .find_map(|name| get_user_by_name(name))
        .ok_or_else(|| {
            Error::new(
                ErrorKind::NotFound,
                "Could not find daemon or nobody user for privilege dropping",
            )
        })?;

    let username = user.name().to_string_lossy();
    let (uid, gid) = (user.uid(), user.primary_group_id());
    info!(
        "Dropping privileges to user {} (uid={}, gid={}) after hardware initialization",
        username, uid, gid
    );

    clear_supplementary_groups()
        .map_err(|e| permission_denied("Failed to clear supplementary groups", e))?;
    // The group has to change while we are still root
    set_both_gid(gid, gid).map_err(|e| permission_denied("Failed to set GID", e))?;
    set_both_uid(uid, uid).map_err(|e| permission_denied("Failed to set UID", e))?;

    if get_current_uid() == 0 {
        return Err(Error::new(
            ErrorKind::PermissionDenied,
            "Failed to drop privileges - still running as root!",
        ));
    }

    info!("Successfully dropped privileges to user {}", username);
    Ok(())
}
