//! A no-op behaviour.

use crate::Behaviour;

/// A [`Behaviour`] whose callbacks do nothing.
///
/// Useful as a placeholder in tests or to reserve a family slot.
#[derive(Debug, Default)]
pub struct NoopBehaviour;

impl Behaviour for NoopBehaviour {}
