use crate::fixture::CircuitInputs;

/// The proving backend the input bundle is handed to. Witness calculation
/// and constraint checking are opaque and may be long-running; the fixture
/// side never looks inside either.
pub trait CircuitHarness {
    type Witness;
    type Error: std::error::Error;

    fn calculate_witness(&self, inputs: &CircuitInputs) -> Result<Self::Witness, Self::Error>;
    fn check_constraints(&self, witness: &Self::Witness) -> Result<(), Self::Error>;
}

/// Drive a harness to completion: witness first, then the constraint check
/// over that witness.
pub fn run<H: CircuitHarness>(
    harness: &H,
    inputs: &CircuitInputs,
) -> Result<H::Witness, H::Error> {
    let witness = harness.calculate_witness(inputs)?;
    harness.check_constraints(&witness)?;
    Ok(witness)
}

#[test]
fn test_run_drives_witness_then_constraints() {
    use num_bigint::BigUint;
    use thiserror::Error;

    use crate::fixture::{build_fixture, FixtureParams};

    #[derive(Debug, Error)]
    enum MockError {
        #[error("input bundle does not match the circuit schema")]
        Shape,
        #[error("word exceeds the field representation")]
        Constraint,
    }

    struct MockHarness;

    impl CircuitHarness for MockHarness {
        type Witness = Vec<BigUint>;
        type Error = MockError;

        fn calculate_witness(&self, inputs: &CircuitInputs) -> Result<Self::Witness, MockError> {
            if inputs.signature.len() != 17 || inputs.public_key.len() != 17 {
                return Err(MockError::Shape);
            }
            inputs
                .signature
                .iter()
                .chain(&inputs.public_key)
                .map(|w| w.parse::<BigUint>().map_err(|_| MockError::Shape))
                .collect()
        }

        fn check_constraints(&self, witness: &Self::Witness) -> Result<(), MockError> {
            let bound = BigUint::from(1u8) << 121u32;
            if witness.iter().all(|w| *w < bound) {
                Ok(())
            } else {
                Err(MockError::Constraint)
            }
        }
    }

    let fixture = build_fixture("Hello World", &FixtureParams::default()).unwrap();
    let witness = run(&MockHarness, &fixture.circuit_inputs()).unwrap();
    assert_eq!(witness.len(), 34);
}
