use crate::error::ScaleResult;

/// Signals that the reference mass is on the scale.
///
/// Calibration blocks inside `confirm` until someone (a person at the
/// keyboard, a UI, a test) says the mass has been placed. Returning an
/// error aborts the calibration before the confirmation is sent.
pub trait Confirmation {
    fn confirm(&mut self, known_mass: f64) -> ScaleResult<()>;
}

impl<F> Confirmation for F
where
    F: FnMut(f64) -> ScaleResult<()>,
{
    fn confirm(&mut self, known_mass: f64) -> ScaleResult<()> {
        self(known_mass)
    }
}
