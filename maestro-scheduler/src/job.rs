//! Pure data: the scheduler's runtime record for a single operator (4.D).

use maestro_core::config::OperatorConfig;
use maestro_core::operator::OperatorHandle;

/// Invariant: `0 <= remaining_repeats <= config.repeat`; while `online` is
/// set, this id has not yet been added to the scheduler's `completed` set.
///
/// The scheduler is the sole mutator — nothing here mutates itself.
pub(crate) struct Job {
    pub config: OperatorConfig,
    pub handle: Option<Box<dyn OperatorHandle>>,
    pub remaining_repeats: u32,
    pub online: bool,
}

impl Job {
    pub fn new(config: OperatorConfig) -> Self {
        let remaining_repeats = config.repeat;
        Self {
            config,
            handle: None,
            remaining_repeats,
            online: false,
        }
    }
}
