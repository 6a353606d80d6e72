//! Keyboard and pointer commands addressed to the page.
//!
//! Keys go to the active element; pointer commands act at the current
//! pointer position, which [`Driver::move_to`] sets.

use crate::browser::keyboard::encode;
use crate::browser::{Element, KeyInput};
use crate::error::Result;
use crate::protocol::{Command, MouseButton};

use super::Driver;

// ============================================================================
// Driver - Keyboard
// ============================================================================

impl Driver {
    /// Sends a key sequence to the active element.
    ///
    /// Modifiers stay held until released by [`Key::Null`](crate::Key::Null)
    /// or the end of the sequence.
    pub async fn keys(&self, keys: &[KeyInput]) -> Result<()> {
        self.logged("keys", "", async {
            self.dispatch(Command::keys(encode(keys))).await?;
            Ok(())
        })
        .await
    }
}

// ============================================================================
// Driver - Pointer
// ============================================================================

impl Driver {
    /// Moves the pointer.
    ///
    /// With an element and no offset, the pointer lands on the element's
    /// center. The offset is relative to the element's top-left corner, or
    /// to the current position when no element is given.
    pub async fn move_to(&self, element: Option<&Element>, offset: Option<(i64, i64)>) -> Result<()> {
        let subject = element.map(|e| e.id().as_str()).unwrap_or_default();
        self.logged("move_to", subject, async {
            self.dispatch(Command::move_to(element.map(Element::id), offset))
                .await?;
            Ok(())
        })
        .await
    }

    /// Clicks a mouse button at the pointer position.
    pub async fn mouse_click(&self, button: MouseButton) -> Result<()> {
        self.logged("mouse_click", "", async {
            self.dispatch(Command::mouse_click(button)).await?;
            Ok(())
        })
        .await
    }

    /// Double-clicks at the pointer position.
    pub async fn double_click(&self) -> Result<()> {
        self.logged("double_click", "", async {
            self.dispatch(Command::double_click()).await?;
            Ok(())
        })
        .await
    }

    /// Presses and holds a mouse button.
    pub async fn button_down(&self, button: MouseButton) -> Result<()> {
        self.logged("button_down", "", async {
            self.dispatch(Command::button_down(button)).await?;
            Ok(())
        })
        .await
    }

    /// Releases a mouse button.
    pub async fn button_up(&self, button: MouseButton) -> Result<()> {
        self.logged("button_up", "", async {
            self.dispatch(Command::button_up(button)).await?;
            Ok(())
        })
        .await
    }
}

// ============================================================================
// Tests
// ============================================================================
