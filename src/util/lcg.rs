use rand::{RngCore, SeedableRng};

/// Linear congruential generator with 32 bit state.
///
/// Cheap enough to keep one per ray; used for picking which hits survive reservoir
/// sampling in local intersections. Not suitable for anything needing quality randomness.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Lcg {
    state: u32,
}

impl Lcg {
    const MULTIPLIER: u32 = 1103515245;
    const INCREMENT: u32 = 12345;

    pub fn new(state: u32) -> Lcg {
        Lcg { state }
    }

    pub fn state(&self) -> u32 {
        self.state
    }

    /// Advances the state and returns it.
    pub fn step(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT);
        self.state
    }
}

impl RngCore for Lcg {
    fn next_u32(&mut self) -> u32 {
        self.step()
    }

    fn next_u64(&mut self) -> u64 {
        let low = u64::from(self.step());
        let high = u64::from(self.step());
        (high << 32) | low
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        for chunk in dst.chunks_mut(4) {
            let bytes = self.step().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
}

impl SeedableRng for Lcg {
    type Seed = [u8; 4];

    fn from_seed(seed: Self::Seed) -> Self {
        Lcg::new(u32::from_le_bytes(seed))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert2::assert;

    #[test]
    fn known_sequence() {
        let mut lcg = Lcg::new(0);
        assert!(lcg.next_u32() == 12345);
        assert!(lcg.next_u32() == 3554416254);
        assert!(lcg.state() == 3554416254);
    }

    #[test]
    fn seeded_generators_repeat() {
        let mut a = Lcg::seed_from_u64(42);
        let mut b = Lcg::seed_from_u64(42);
        let a_values: Vec<u32> = (0..10).map(|_| a.next_u32()).collect();
        let b_values: Vec<u32> = (0..10).map(|_| b.next_u32()).collect();
        assert!(a_values == b_values);
    }

    #[test]
    fn fill_bytes_partial_chunk() {
        let mut lcg = Lcg::new(0);
        let mut bytes = [0u8; 6];
        lcg.fill_bytes(&mut bytes);
        assert!(bytes[..4] == 12345u32.to_le_bytes());
        assert!(bytes[4..] == 3554416254u32.to_le_bytes()[..2]);
    }
}
