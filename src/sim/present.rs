//! Seam towards the presentation thread
//!
//! The world never draws. Once per tick it asks the presenter for a redraw;
//! the presentation thread then pulls a depth-ordered snapshot.

use crossbeam_channel::{Receiver, Sender, bounded};

use crate::geom::{Pos, Shape};

use super::entity::EntityId;

/// Everything the presenter needs to draw one entity
#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub id: EntityId,
    pub kind: &'static str,
    pub pos: Pos,
    pub depth: i32,
    /// Global collision shape, if any (debug outlines, placeholder art)
    pub shape: Option<Shape>,
    pub variant: u32,
}

pub trait Presenter: Send + Sync {
    /// Side-effect only; must not block the ticking thread
    fn request_redraw(&self);
}

/// Presenter for headless runs and tests
#[derive(Debug, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn request_redraw(&self) {}
}

/// Forwards redraw requests over a one-slot channel
///
/// Requests coalesce while the presentation thread is behind, so a slow
/// drawer never stalls the ticking thread.
#[derive(Debug)]
pub struct ChannelPresenter {
    tx: Sender<()>,
}

impl ChannelPresenter {
    pub fn new() -> (Self, Receiver<()>) {
        let (tx, rx) = bounded(1);
        (Self { tx }, rx)
    }
}

impl Presenter for ChannelPresenter {
    fn request_redraw(&self) {
        let _ = self.tx.try_send(());
    }
}
