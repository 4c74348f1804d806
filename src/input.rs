//! Synthetic pointer input
//!
//! The engine only sees [`InputBackend`]; [`X11Input`] implements it with XTest
//! so clicks reach whatever window is under the pointer.

use std::sync::Arc;
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{ConnectionExt as _, Window};
use x11rb::protocol::xtest::ConnectionExt as _;
use x11rb::rust_connection::RustConnection;

use crate::constants::x11;
use crate::error::InputError;
use crate::types::{MouseButton, Point};
use crate::x11_utils::X11Context;

/// Pointer capabilities needed to click
pub trait InputBackend {
    fn cursor_position(&self) -> Result<Point, InputError>;

    fn move_cursor(&self, to: Point) -> Result<(), InputError>;

    /// One press followed by one release
    fn click_button(&self, button: MouseButton) -> Result<(), InputError>;
}

pub struct X11Input {
    conn: Arc<RustConnection>,
    root: Window,
}

impl X11Input {
    pub fn new(ctx: &X11Context) -> Self {
        Self { conn: Arc::clone(&ctx.conn), root: ctx.root }
    }

    fn fake_button(&self, event_type: u8, button: u8) -> Result<(), InputError> {
        self.conn
            .xtest_fake_input(event_type, button, x11::CURRENT_TIME, self.root, 0, 0, 0)
            .map_err(|e| InputError::SendEvent(e.to_string()))?;
        Ok(())
    }
}

impl InputBackend for X11Input {
    fn cursor_position(&self) -> Result<Point, InputError> {
        let reply = self
            .conn
            .query_pointer(self.root)
            .map_err(|e| InputError::QueryPointer(e.to_string()))?
            .reply()
            .map_err(|e| InputError::QueryPointer(e.to_string()))?;
        Ok(Point::new(reply.root_x as i32, reply.root_y as i32))
    }

    fn move_cursor(&self, to: Point) -> Result<(), InputError> {
        let x = to.x.clamp(i16::MIN as i32, i16::MAX as i32) as i16;
        let y = to.y.clamp(i16::MIN as i32, i16::MAX as i32) as i16;
        self.conn
            .warp_pointer(x11rb::NONE, self.root, 0, 0, 0, 0, x, y)
            .map_err(|e| InputError::MovePointer(e.to_string()))?;
        self.conn.flush().map_err(|e| InputError::MovePointer(e.to_string()))?;
        Ok(())
    }

    fn click_button(&self, button: MouseButton) -> Result<(), InputError> {
        let detail = button.x11_button();
        self.fake_button(x11::BUTTON_PRESS, detail)?;
        self.fake_button(x11::BUTTON_RELEASE, detail)?;
        self.conn.flush().map_err(|e| InputError::SendEvent(e.to_string()))?;
        Ok(())
    }
}
