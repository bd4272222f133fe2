//! # Tree Traversal
//!
//! A depth-first walk in reading order. Each pass is a [`Visitor`] that owns its own
//! state and gets the score mutably, so per-note results can be written back while
//! walking.
//!
//! For every node the walk calls `enter`, then walks the children (unless `enter`
//! asked to skip them), then calls `leave`. Returning [`Flow::Stop`] ends the whole
//! walk; an `Err` aborts it.

use crate::error::ScoreError;
use crate::tree::{NodeId, Score};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    SkipChildren,
    Stop,
}

pub trait Visitor {
    fn enter(&mut self, _score: &mut Score, _id: NodeId) -> Result<Flow, ScoreError> {
        Ok(Flow::Continue)
    }

    fn leave(&mut self, _score: &mut Score, _id: NodeId) -> Result<(), ScoreError> {
        Ok(())
    }
}

/// Walk the subtree rooted at `start`
pub fn walk<V: Visitor + ?Sized>(score: &mut Score, start: NodeId, visitor: &mut V) -> Result<Flow, ScoreError> {
    log::trace!("enter {:?}", score.xml_id(start));
    match visitor.enter(score, start)? {
        Flow::Stop => return Ok(Flow::Stop),
        Flow::SkipChildren => {}
        Flow::Continue => {
            // Children ids are copied so the visitor may mutate the score meanwhile
            let children = score.children(start).to_vec();
            for child in children {
                if walk(score, child, visitor)? == Flow::Stop {
                    return Ok(Flow::Stop);
                }
            }
        }
    }
    visitor.leave(score, start)?;
    Ok(Flow::Continue)
}
