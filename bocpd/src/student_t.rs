//! Location/scale Student's t distribution

use rand::Rng;
use rv::prelude::{Rv, StudentsT as RvStudentsT};

/// `StudentT` Rv with a location and scale on top of `rv`'s standard one.
#[derive(Clone, Debug, PartialEq)]
pub struct StudentT {
    /// Inner standard Student's t
    pub st: RvStudentsT,
    /// Location
    pub mu: f64,
    /// Scale
    pub sigma: f64,
}

impl StudentT {
    /// Create a new `StudentT` with location `mu`, scale `sigma` and
    /// `v` degrees of freedom. Parameters are not validated.
    #[must_use]
    pub fn new(mu: f64, sigma: f64, v: f64) -> Self {
        Self {
            st: RvStudentsT::new_unchecked(v),
            mu,
            sigma,
        }
    }
}

impl Rv<f64> for StudentT {
    fn ln_f(&self, x: &f64) -> f64 {
        self.st.ln_f(&((x - self.mu) / self.sigma)) - self.sigma.ln()
    }

    fn draw<R: Rng>(&self, rng: &mut R) -> f64 {
        let s: f64 = self.st.draw(rng);
        s.mul_add(self.sigma, self.mu)
    }
}
