//! Pipeline step trait definition.
//!
//! All pipeline steps implement this trait, providing a consistent
//! interface for validation and execution.

use super::errors::StepResult;
use super::types::{Context, SessionState, StepOutcome};

/// Trait for pipeline steps.
///
/// The pipeline runner calls these methods in order:
///
/// 1. `validate_input` - Check preconditions before execution
/// 2. `execute` - Perform the step's work
/// 3. `validate_output` - Verify the step produced valid output
///
/// # Example
///
/// ```ignore
/// struct CurveStep;
///
/// impl PipelineStep for CurveStep {
///     fn name(&self) -> &str { "Curve" }
///
///     fn validate_input(&self, _ctx: &Context, state: &SessionState) -> StepResult<()> {
///         if state.safe_frames.is_none() {
///             return Err(StepError::precondition_failed("no safe frames"));
///         }
///         Ok(())
///     }
///
///     fn execute(&self, ctx: &Context, state: &mut SessionState) -> StepResult<StepOutcome> {
///         state.curve = Some(build_curve(...)?);
///         Ok(StepOutcome::Success)
///     }
///
///     fn validate_output(&self, _ctx: &Context, state: &SessionState) -> StepResult<()> {
///         if !state.has_curve() {
///             return Err(StepError::invalid_output("curve not recorded"));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait PipelineStep: Send + Sync {
    /// Get the step name (for logging and error context).
    fn name(&self) -> &str;

    /// Validate inputs before execution.
    ///
    /// Should check that files exist and that earlier steps recorded what
    /// this step reads.
    fn validate_input(&self, ctx: &Context, state: &SessionState) -> StepResult<()>;

    /// Execute the step's main work and record results in `state`.
    ///
    /// Returns `StepOutcome::Skipped` if the step does not apply to this
    /// session (not an error).
    fn execute(&self, ctx: &Context, state: &mut SessionState) -> StepResult<StepOutcome>;

    /// Validate outputs after `execute` returned `Success`.
    fn validate_output(&self, ctx: &Context, state: &SessionState) -> StepResult<()>;

    /// Human-readable description of what this step does.
    fn description(&self) -> &str {
        self.name()
    }
}
