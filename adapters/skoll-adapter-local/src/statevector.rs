//! Statevector simulation engine.
//!
//! Amplitude indexing is little-endian: qubit 0 is the least-significant
//! bit of the amplitude index.

use num_complex::Complex64;
use rand::Rng;
use std::f64::consts::{FRAC_1_SQRT_2, PI};

use skoll_ir::StandardGate;

use crate::error::SimulatorError;

/// A statevector over `n` qubits.
pub struct Statevector {
    amplitudes: Vec<Complex64>,
    num_qubits: usize,
}

impl Statevector {
    /// Create a statevector initialized to |0…0⟩.
    pub fn new(num_qubits: usize) -> Self {
        let size = 1usize << num_qubits;
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); size];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Self {
            amplitudes,
            num_qubits,
        }
    }

    /// Number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// The amplitude vector.
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Consume the statevector, returning the amplitude vector.
    pub fn into_amplitudes(self) -> Vec<Complex64> {
        self.amplitudes
    }

    /// Apply a standard gate to the given qubits.
    ///
    /// Operand arity is validated by the circuit builder; angles must be
    /// concrete by the time they reach the engine.
    pub fn apply_gate(
        &mut self,
        gate: &StandardGate,
        qubits: &[usize],
    ) -> Result<(), SimulatorError> {
        match gate {
            StandardGate::I => {}
            StandardGate::X => self.apply_1q(qubits[0], x_matrix()),
            StandardGate::Y => self.apply_1q(qubits[0], y_matrix()),
            StandardGate::Z => self.apply_phase(qubits[0], PI),
            StandardGate::H => self.apply_1q(qubits[0], h_matrix()),
            StandardGate::S => self.apply_phase(qubits[0], PI / 2.0),
            StandardGate::Sdg => self.apply_phase(qubits[0], -PI / 2.0),
            StandardGate::T => self.apply_phase(qubits[0], PI / 4.0),
            StandardGate::Tdg => self.apply_phase(qubits[0], -PI / 4.0),
            StandardGate::SX => self.apply_1q(qubits[0], sx_matrix(false)),
            StandardGate::SXdg => self.apply_1q(qubits[0], sx_matrix(true)),
            StandardGate::Rx(p) => {
                let theta = angle(p)?;
                self.apply_1q(qubits[0], rx_matrix(theta));
            }
            StandardGate::Ry(p) => {
                let theta = angle(p)?;
                self.apply_1q(qubits[0], ry_matrix(theta));
            }
            StandardGate::Rz(p) => {
                let theta = angle(p)?;
                self.apply_1q(qubits[0], rz_matrix(theta));
            }
            StandardGate::P(p) => {
                let theta = angle(p)?;
                self.apply_phase(qubits[0], theta);
            }
            StandardGate::U(t, f, l) => {
                let matrix = u_matrix(angle(t)?, angle(f)?, angle(l)?);
                self.apply_1q(qubits[0], matrix);
            }

            StandardGate::CX => self.apply_controlled_1q(qubits[0], qubits[1], x_matrix()),
            StandardGate::CY => self.apply_controlled_1q(qubits[0], qubits[1], y_matrix()),
            StandardGate::CZ => self.apply_cphase(qubits[0], qubits[1], PI),
            StandardGate::CH => self.apply_controlled_1q(qubits[0], qubits[1], h_matrix()),
            StandardGate::Swap => self.apply_swap(qubits[0], qubits[1]),
            StandardGate::ISwap => self.apply_iswap(qubits[0], qubits[1]),
            StandardGate::CRz(p) => {
                let theta = angle(p)?;
                self.apply_controlled_1q(qubits[0], qubits[1], rz_matrix(theta));
            }
            StandardGate::CP(p) => {
                let theta = angle(p)?;
                self.apply_cphase(qubits[0], qubits[1], theta);
            }

            StandardGate::CCX => self.apply_ccx(qubits[0], qubits[1], qubits[2]),
            StandardGate::CSwap => self.apply_cswap(qubits[0], qubits[1], qubits[2]),
        }
        Ok(())
    }

    /// Apply a 2x2 unitary to one qubit.
    fn apply_1q(&mut self, qubit: usize, m: [[Complex64; 2]; 2]) {
        let mask = 1usize << qubit;
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = m[0][0] * a + m[0][1] * b;
                self.amplitudes[j] = m[1][0] * a + m[1][1] * b;
            }
        }
    }

    /// Apply a 2x2 unitary to `target`, controlled on `control`.
    fn apply_controlled_1q(&mut self, control: usize, target: usize, m: [[Complex64; 2]; 2]) {
        let ctrl_mask = 1usize << control;
        let tgt_mask = 1usize << target;
        for i in 0..self.amplitudes.len() {
            if (i & ctrl_mask != 0) && (i & tgt_mask == 0) {
                let j = i | tgt_mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = m[0][0] * a + m[0][1] * b;
                self.amplitudes[j] = m[1][0] * a + m[1][1] * b;
            }
        }
    }

    /// Multiply the |1⟩ branch of a qubit by e^{iθ}.
    fn apply_phase(&mut self, qubit: usize, theta: f64) {
        let mask = 1usize << qubit;
        let phase = Complex64::from_polar(1.0, theta);
        for i in 0..self.amplitudes.len() {
            if i & mask != 0 {
                self.amplitudes[i] *= phase;
            }
        }
    }

    /// Multiply the |11⟩ branch of two qubits by e^{iθ}.
    fn apply_cphase(&mut self, control: usize, target: usize, theta: f64) {
        let ctrl_mask = 1usize << control;
        let tgt_mask = 1usize << target;
        let phase = Complex64::from_polar(1.0, theta);
        for i in 0..self.amplitudes.len() {
            if (i & ctrl_mask != 0) && (i & tgt_mask != 0) {
                self.amplitudes[i] *= phase;
            }
        }
    }

    fn apply_swap(&mut self, q1: usize, q2: usize) {
        let mask1 = 1usize << q1;
        let mask2 = 1usize << q2;
        for i in 0..self.amplitudes.len() {
            if (i & mask1 != 0) && (i & mask2 == 0) {
                let j = (i & !mask1) | mask2;
                self.amplitudes.swap(i, j);
            }
        }
    }

    fn apply_iswap(&mut self, q1: usize, q2: usize) {
        let mask1 = 1usize << q1;
        let mask2 = 1usize << q2;
        let i_val = Complex64::new(0.0, 1.0);
        for i in 0..self.amplitudes.len() {
            if (i & mask1 != 0) && (i & mask2 == 0) {
                let j = (i & !mask1) | mask2;
                let tmp = self.amplitudes[i];
                self.amplitudes[i] = i_val * self.amplitudes[j];
                self.amplitudes[j] = i_val * tmp;
            }
        }
    }

    fn apply_ccx(&mut self, c1: usize, c2: usize, target: usize) {
        let c1_mask = 1usize << c1;
        let c2_mask = 1usize << c2;
        let tgt_mask = 1usize << target;
        for i in 0..self.amplitudes.len() {
            if (i & c1_mask != 0) && (i & c2_mask != 0) && (i & tgt_mask == 0) {
                let j = i | tgt_mask;
                self.amplitudes.swap(i, j);
            }
        }
    }

    fn apply_cswap(&mut self, control: usize, t1: usize, t2: usize) {
        let ctrl_mask = 1usize << control;
        let t1_mask = 1usize << t1;
        let t2_mask = 1usize << t2;
        for i in 0..self.amplitudes.len() {
            if (i & ctrl_mask != 0) && (i & t1_mask != 0) && (i & t2_mask == 0) {
                let j = (i & !t1_mask) | t2_mask;
                self.amplitudes.swap(i, j);
            }
        }
    }

    /// Probability of measuring |1⟩ on a qubit.
    pub fn probability_one(&self, qubit: usize) -> f64 {
        let mask = 1usize << qubit;
        self.amplitudes
            .iter()
            .enumerate()
            .filter(|(i, _)| i & mask != 0)
            .map(|(_, amp)| amp.norm_sqr())
            .sum()
    }

    /// Measure one qubit, collapsing the state onto the outcome branch.
    ///
    /// Returns the measured bit. The surviving branch is renormalized.
    pub fn measure_collapse<R: Rng>(&mut self, qubit: usize, rng: &mut R) -> u8 {
        let p_one = self.probability_one(qubit);
        let r: f64 = rng.r#gen();
        let outcome = u8::from(r < p_one);

        let p_branch = if outcome == 1 { p_one } else { 1.0 - p_one };
        let norm = p_branch.sqrt();
        let mask = 1usize << qubit;
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            let in_branch = ((i & mask != 0) as u8) == outcome;
            if in_branch {
                if norm > 0.0 {
                    *amp /= norm;
                }
            } else {
                *amp = Complex64::new(0.0, 0.0);
            }
        }
        outcome
    }

    /// Reset a qubit to |0⟩ by measuring and flipping if needed.
    pub fn reset<R: Rng>(&mut self, qubit: usize, rng: &mut R) {
        if self.measure_collapse(qubit, rng) == 1 {
            self.apply_1q(qubit, x_matrix());
        }
    }

    /// Sample a full-register outcome from the amplitude distribution.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> usize {
        let r: f64 = rng.r#gen();
        let mut cumulative = 0.0;
        for (i, amp) in self.amplitudes.iter().enumerate() {
            cumulative += amp.norm_sqr();
            if r < cumulative {
                return i;
            }
        }
        // Accumulated rounding error on a normalized state.
        self.amplitudes.len() - 1
    }
}

fn angle(p: &skoll_ir::ParameterExpression) -> Result<f64, SimulatorError> {
    p.as_f64().ok_or_else(|| {
        let symbols: Vec<_> = p.symbols().into_iter().collect();
        SimulatorError::UnboundParameters(symbols.join(", "))
    })
}

fn x_matrix() -> [[Complex64; 2]; 2] {
    [
        [Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0)],
        [Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)],
    ]
}

fn y_matrix() -> [[Complex64; 2]; 2] {
    let i = Complex64::new(0.0, 1.0);
    [[Complex64::new(0.0, 0.0), -i], [i, Complex64::new(0.0, 0.0)]]
}

fn h_matrix() -> [[Complex64; 2]; 2] {
    let h = Complex64::new(FRAC_1_SQRT_2, 0.0);
    [[h, h], [h, -h]]
}

fn sx_matrix(dagger: bool) -> [[Complex64; 2]; 2] {
    let sign = if dagger { -1.0 } else { 1.0 };
    let d = Complex64::new(0.5, sign * 0.5);
    let o = Complex64::new(0.5, -sign * 0.5);
    [[d, o], [o, d]]
}

fn rx_matrix(theta: f64) -> [[Complex64; 2]; 2] {
    let c = Complex64::new((theta / 2.0).cos(), 0.0);
    let s = Complex64::new(0.0, -(theta / 2.0).sin());
    [[c, s], [s, c]]
}

fn ry_matrix(theta: f64) -> [[Complex64; 2]; 2] {
    let c = Complex64::new((theta / 2.0).cos(), 0.0);
    let s = Complex64::new((theta / 2.0).sin(), 0.0);
    [[c, -s], [s, c]]
}

fn rz_matrix(theta: f64) -> [[Complex64; 2]; 2] {
    [
        [Complex64::from_polar(1.0, -theta / 2.0), Complex64::new(0.0, 0.0)],
        [Complex64::new(0.0, 0.0), Complex64::from_polar(1.0, theta / 2.0)],
    ]
}

fn u_matrix(theta: f64, phi: f64, lambda: f64) -> [[Complex64; 2]; 2] {
    let c = (theta / 2.0).cos();
    let s = (theta / 2.0).sin();
    [
        [
            Complex64::new(c, 0.0),
            -Complex64::from_polar(s, lambda),
        ],
        [
            Complex64::from_polar(s, phi),
            Complex64::from_polar(c, phi + lambda),
        ],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use skoll_ir::ParameterExpression;

    fn approx_eq(a: Complex64, b: Complex64) -> bool {
        (a - b).norm() < 1e-10
    }

    #[test]
    fn initial_state() {
        let sv = Statevector::new(2);
        assert!(approx_eq(sv.amplitudes()[0], Complex64::new(1.0, 0.0)));
        for amp in &sv.amplitudes()[1..] {
            assert!(approx_eq(*amp, Complex64::new(0.0, 0.0)));
        }
    }

    #[test]
    fn hadamard_superposition() {
        let mut sv = Statevector::new(1);
        sv.apply_gate(&StandardGate::H, &[0]).unwrap();
        let expected = Complex64::new(FRAC_1_SQRT_2, 0.0);
        assert!(approx_eq(sv.amplitudes()[0], expected));
        assert!(approx_eq(sv.amplitudes()[1], expected));
    }

    #[test]
    fn bell_state() {
        let mut sv = Statevector::new(2);
        sv.apply_gate(&StandardGate::H, &[0]).unwrap();
        sv.apply_gate(&StandardGate::CX, &[0, 1]).unwrap();
        let expected = Complex64::new(FRAC_1_SQRT_2, 0.0);
        assert!(approx_eq(sv.amplitudes()[0], expected));
        assert!(approx_eq(sv.amplitudes()[1], Complex64::new(0.0, 0.0)));
        assert!(approx_eq(sv.amplitudes()[2], Complex64::new(0.0, 0.0)));
        assert!(approx_eq(sv.amplitudes()[3], expected));
    }

    #[test]
    fn x_flips() {
        let mut sv = Statevector::new(1);
        sv.apply_gate(&StandardGate::X, &[0]).unwrap();
        assert!(approx_eq(sv.amplitudes()[1], Complex64::new(1.0, 0.0)));
    }

    #[test]
    fn u_gate_matches_hadamard() {
        // U(π/2, 0, π) = H
        let mut via_u = Statevector::new(1);
        via_u
            .apply_gate(
                &StandardGate::U(
                    ParameterExpression::pi() / ParameterExpression::constant(2.0),
                    0.0.into(),
                    ParameterExpression::pi(),
                ),
                &[0],
            )
            .unwrap();
        let mut via_h = Statevector::new(1);
        via_h.apply_gate(&StandardGate::H, &[0]).unwrap();
        for (a, b) in via_u.amplitudes().iter().zip(via_h.amplitudes()) {
            assert!(approx_eq(*a, *b));
        }
    }

    #[test]
    fn sx_squares_to_x() {
        let mut sv = Statevector::new(1);
        sv.apply_gate(&StandardGate::SX, &[0]).unwrap();
        sv.apply_gate(&StandardGate::SX, &[0]).unwrap();
        assert!(approx_eq(sv.amplitudes()[1], Complex64::new(1.0, 0.0)));
    }

    #[test]
    fn sxdg_undoes_sx() {
        let mut sv = Statevector::new(1);
        sv.apply_gate(&StandardGate::SX, &[0]).unwrap();
        sv.apply_gate(&StandardGate::SXdg, &[0]).unwrap();
        assert!(approx_eq(sv.amplitudes()[0], Complex64::new(1.0, 0.0)));
    }

    #[test]
    fn swap_moves_amplitude() {
        let mut sv = Statevector::new(2);
        sv.apply_gate(&StandardGate::X, &[0]).unwrap();
        sv.apply_gate(&StandardGate::Swap, &[0, 1]).unwrap();
        assert!(approx_eq(sv.amplitudes()[2], Complex64::new(1.0, 0.0)));
    }

    #[test]
    fn iswap_adds_phase() {
        let mut sv = Statevector::new(2);
        sv.apply_gate(&StandardGate::X, &[0]).unwrap();
        sv.apply_gate(&StandardGate::ISwap, &[0, 1]).unwrap();
        assert!(approx_eq(sv.amplitudes()[2], Complex64::new(0.0, 1.0)));
    }

    #[test]
    fn ccx_toggles_only_when_both_controls_set() {
        let mut sv = Statevector::new(3);
        sv.apply_gate(&StandardGate::X, &[0]).unwrap();
        sv.apply_gate(&StandardGate::CCX, &[0, 1, 2]).unwrap();
        // Only one control set: no flip.
        assert!(approx_eq(sv.amplitudes()[0b001], Complex64::new(1.0, 0.0)));

        sv.apply_gate(&StandardGate::X, &[1]).unwrap();
        sv.apply_gate(&StandardGate::CCX, &[0, 1, 2]).unwrap();
        assert!(approx_eq(sv.amplitudes()[0b111], Complex64::new(1.0, 0.0)));
    }

    #[test]
    fn cswap_swaps_targets_when_control_set() {
        let mut sv = Statevector::new(3);
        sv.apply_gate(&StandardGate::X, &[0]).unwrap();
        sv.apply_gate(&StandardGate::X, &[1]).unwrap();
        sv.apply_gate(&StandardGate::CSwap, &[0, 1, 2]).unwrap();
        assert!(approx_eq(sv.amplitudes()[0b101], Complex64::new(1.0, 0.0)));
    }

    #[test]
    fn unbound_parameter_errors() {
        let mut sv = Statevector::new(1);
        let result = sv.apply_gate(
            &StandardGate::Rx(ParameterExpression::symbol("theta")),
            &[0],
        );
        assert!(matches!(result, Err(SimulatorError::UnboundParameters(_))));
    }

    #[test]
    fn measure_collapse_deterministic_branches() {
        let mut rng = StdRng::seed_from_u64(7);

        let mut sv = Statevector::new(1);
        sv.apply_gate(&StandardGate::X, &[0]).unwrap();
        assert_eq!(sv.measure_collapse(0, &mut rng), 1);

        let mut sv = Statevector::new(1);
        assert_eq!(sv.measure_collapse(0, &mut rng), 0);
    }

    #[test]
    fn measure_collapse_renormalizes() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut sv = Statevector::new(2);
        sv.apply_gate(&StandardGate::H, &[0]).unwrap();
        sv.apply_gate(&StandardGate::CX, &[0, 1]).unwrap();
        let outcome = sv.measure_collapse(0, &mut rng);
        // Collapsed Bell state: both qubits agree, norm restored.
        let total: f64 = sv.amplitudes().iter().map(|a| a.norm_sqr()).sum();
        assert!((total - 1.0).abs() < 1e-10);
        let surviving = if outcome == 1 { 0b11 } else { 0b00 };
        assert!(approx_eq(sv.amplitudes()[surviving], Complex64::new(1.0, 0.0)));
    }

    #[test]
    fn reset_forces_zero() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..20 {
            let mut sv = Statevector::new(1);
            sv.apply_gate(&StandardGate::H, &[0]).unwrap();
            sv.reset(0, &mut rng);
            assert!(approx_eq(sv.amplitudes()[0], Complex64::new(1.0, 0.0)));
        }
    }

    #[test]
    fn sample_respects_distribution() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut sv = Statevector::new(2);
        sv.apply_gate(&StandardGate::X, &[1]).unwrap();
        for _ in 0..50 {
            assert_eq!(sv.sample(&mut rng), 0b10);
        }
    }
}
