use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info};
use x11rb::connection::Connection;
use x11rb::protocol::xproto::*;
use x11rb::protocol::xtest::ConnectionExt as XTestExt;
use x11rb::rust_connection::RustConnection;

use crate::constants::x11;
use crate::types::Modifiers;

/// Shared X connection and the root window clicks and grabs are aimed at
///
/// The connection is shared between the UI thread (pointer queries, injection,
/// grabs) and the hotkey event pump.
#[derive(Clone)]
pub struct X11Context {
    pub conn: Arc<RustConnection>,
    pub root: Window,
    pub screen_width: u16,
    pub screen_height: u16,
}

impl X11Context {
    /// Connect to `$DISPLAY` and make sure XTest is available
    pub fn connect() -> Result<Self> {
        let (conn, screen_num) = x11rb::connect(None).context("Failed to connect to X server")?;

        let screen = conn
            .setup()
            .roots
            .get(screen_num)
            .with_context(|| format!("X server reported no screen {}", screen_num))?;
        let root = screen.root;
        let screen_width = screen.width_in_pixels;
        let screen_height = screen.height_in_pixels;

        let version = conn
            .xtest_get_version(2, 2)
            .context("XTest extension is not available")?
            .reply()
            .context("XTest extension is not available")?;
        info!(
            screen = screen_num,
            width = screen_width,
            height = screen_height,
            xtest = %format!("{}.{}", version.major_version, version.minor_version),
            "Connected to X server"
        );

        Ok(Self { conn: Arc::new(conn), root, screen_width, screen_height })
    }
}

/// Modifier bits that don't change the meaning of a hotkey
/// (CapsLock and NumLock); grabs are repeated for each combination
pub const LOCK_VARIANTS: [u16; 4] = [
    0,
    x11::MASK_LOCK,
    x11::MASK_NUM_LOCK,
    x11::MASK_LOCK | x11::MASK_NUM_LOCK,
];

/// Core protocol modifier mask for a combo (Alt = Mod1, Super = Mod4)
pub fn modifier_mask(modifiers: Modifiers) -> u16 {
    let mut mask = 0u16;
    if modifiers.ctrl {
        mask |= x11::MASK_CONTROL;
    }
    if modifiers.shift {
        mask |= x11::MASK_SHIFT;
    }
    if modifiers.alt {
        mask |= x11::MASK_ALT;
    }
    if modifiers.super_key {
        mask |= x11::MASK_SUPER;
    }
    mask
}

/// Strip lock bits and button state from an event's modifier state
pub fn significant_modifiers(state: u16) -> u16 {
    state & (x11::MASK_CONTROL | x11::MASK_SHIFT | x11::MASK_ALT | x11::MASK_SUPER)
}

/// Keysym for a canonical key name (see `types::canonical_key_name`)
pub fn keysym_for(key: &str) -> Option<u32> {
    let named = match key {
        "SPACE" => Some(0x0020),
        "ENTER" => Some(0xff0d),
        "ESCAPE" => Some(0xff1b),
        "TAB" => Some(0xff09),
        "INSERT" => Some(0xff63),
        "DELETE" => Some(0xffff),
        "HOME" => Some(0xff50),
        "END" => Some(0xff57),
        "PAGEUP" => Some(0xff55),
        "PAGEDOWN" => Some(0xff56),
        "LEFT" => Some(0xff51),
        "UP" => Some(0xff52),
        "RIGHT" => Some(0xff53),
        "DOWN" => Some(0xff54),
        "PAUSE" => Some(0xff13),
        "SCROLL_LOCK" => Some(0xff14),
        "CAPS_LOCK" => Some(0xffe5),
        _ => None,
    };
    if named.is_some() {
        return named;
    }

    if let Some(n) = key.strip_prefix("NUMPAD") {
        return n.parse::<u32>().ok().filter(|n| *n <= 9).map(|n| 0xffb0 + n);
    }

    if let Some(n) = key.strip_prefix('F')
        && !n.is_empty()
    {
        return n.parse::<u32>().ok().filter(|n| (1..=24).contains(n)).map(|n| 0xffbe + n - 1);
    }

    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        // Letter keysyms are the lowercase Latin-1 code points
        (Some(c), None) if c.is_ascii_alphabetic() => Some(c.to_ascii_lowercase() as u32),
        (Some(c), None) if c.is_ascii_digit() => Some(c as u32),
        _ => None,
    }
}

/// Find the keycode that produces `keysym` in the current keyboard mapping
pub fn keycode_for_keysym(conn: &RustConnection, keysym: u32) -> Result<Option<Keycode>> {
    let setup = conn.setup();
    let min = setup.min_keycode;
    let max = setup.max_keycode;

    let mapping = conn
        .get_keyboard_mapping(min, max - min + 1)
        .context("Failed to query keyboard mapping")?
        .reply()
        .context("Failed to get keyboard mapping reply")?;

    let per_keycode = mapping.keysyms_per_keycode as usize;
    if per_keycode == 0 {
        return Ok(None);
    }

    let found = mapping
        .keysyms
        .chunks(per_keycode)
        .position(|syms| syms.contains(&keysym))
        .map(|index| min + index as u8);

    debug!(keysym = format!("{:#x}", keysym), keycode = ?found, "Resolved keysym");
    Ok(found)
}
