//! End-to-end tests running circuits through the provider surface.

use skoll_adapter_local::{LocalProvider, QASM_SIMULATOR, STATEVECTOR_SIMULATOR, QasmBackend};
use skoll_hal::{Backend, BackendConfig};
use skoll_ir::{Circuit, ClassicalCondition, QubitId, StandardGate};

// ---------------------------------------------------------------------------
// Provider wiring
// ---------------------------------------------------------------------------

#[tokio::test]
async fn provider_creates_working_backends() {
    let provider = LocalProvider::new();
    let circuit = Circuit::bell().unwrap();

    let qasm = provider.get_backend(QASM_SIMULATOR).unwrap();
    let job_id = qasm.submit(&circuit, 100, None).await.unwrap();
    let result = qasm.wait(&job_id).await.unwrap();
    assert_eq!(result.counts.total(), 100);

    let sv = provider.get_backend(STATEVECTOR_SIMULATOR).unwrap();
    let mut gates_only = Circuit::with_size("bell_gates", 2, 0);
    gates_only.h(QubitId(0)).unwrap();
    gates_only.cx(QubitId(0), QubitId(1)).unwrap();
    let job_id = sv.submit(&gates_only, 1, None).await.unwrap();
    let result = sv.wait(&job_id).await.unwrap();
    assert_eq!(result.statevector.unwrap().len(), 4);
}

#[tokio::test]
async fn provider_config_controls_seed_and_memory() {
    let provider = LocalProvider::new();
    let config = BackendConfig::new(QASM_SIMULATOR)
        .with_extra("seed", serde_json::json!(1234))
        .with_extra("memory", serde_json::json!(true));

    let backend = provider
        .get_backend_with_config(QASM_SIMULATOR, config)
        .unwrap();
    let circuit = Circuit::bell().unwrap();
    let job_id = backend.submit(&circuit, 20, None).await.unwrap();
    let result = backend.result(&job_id).await.unwrap();

    assert_eq!(result.seed, Some(1234));
    assert_eq!(result.memory.unwrap().len(), 20);
}

#[tokio::test]
async fn backends_report_availability() {
    let provider = LocalProvider::new();
    for name in provider.backends(None) {
        let backend = provider.get_backend(&name).unwrap();
        let availability = backend.availability().await.unwrap();
        assert!(availability.is_available);
        assert_eq!(availability.queue_depth, Some(0));
    }
}

// ---------------------------------------------------------------------------
// Cross-backend consistency
// ---------------------------------------------------------------------------

#[tokio::test]
async fn counts_match_statevector_probabilities() {
    // Uniform superposition over 3 qubits: every outcome ~1/8.
    let provider = LocalProvider::new();

    let mut gates = Circuit::with_size("uniform", 3, 0);
    for i in 0..3 {
        gates.h(QubitId(i)).unwrap();
    }
    let sv_backend = provider.get_backend(STATEVECTOR_SIMULATOR).unwrap();
    let job_id = sv_backend.submit(&gates, 1, None).await.unwrap();
    let statevector = sv_backend
        .result(&job_id)
        .await
        .unwrap()
        .statevector
        .unwrap();
    for amp in &statevector {
        assert!((amp.norm_sqr() - 0.125).abs() < 1e-10);
    }

    let mut counted = gates.clone();
    counted.measure_all().unwrap();
    let shots = 4096;
    let qasm = QasmBackend::new().with_seed(17);
    let job_id = qasm.submit(&counted, shots, None).await.unwrap();
    let counts = qasm.result(&job_id).await.unwrap().counts;

    assert_eq!(counts.total(), u64::from(shots));
    assert_eq!(counts.len(), 8);
    let threshold = 0.04 * f64::from(shots);
    for (_, count) in counts.iter() {
        let expected = f64::from(shots) / 8.0;
        assert!((count as f64 - expected).abs() < threshold);
    }
}

#[tokio::test]
async fn qft_of_ground_state_is_uniform() {
    let provider = LocalProvider::new();
    let backend = provider.get_backend(STATEVECTOR_SIMULATOR).unwrap();

    let circuit = Circuit::qft(4).unwrap();
    let job_id = backend.submit(&circuit, 1, None).await.unwrap();
    let statevector = backend.result(&job_id).await.unwrap().statevector.unwrap();

    let expected = 1.0 / 4.0; // 1/sqrt(16)
    for amp in &statevector {
        assert!((amp.re - expected).abs() < 1e-10);
        assert!(amp.im.abs() < 1e-10);
    }
}

// ---------------------------------------------------------------------------
// Classical flow
// ---------------------------------------------------------------------------

#[tokio::test]
async fn teleportation_delivers_the_state() {
    // Teleport |1⟩ from q0 to q2 using mid-circuit measurement and
    // classically conditioned corrections.
    let mut circuit = Circuit::new("teleport");
    let q = circuit.add_qreg("q", 3);
    let m0 = circuit.add_creg("m0", 1);
    let m1 = circuit.add_creg("m1", 1);
    let out = circuit.add_creg("out", 1);

    circuit.x(q[0]).unwrap(); // state to teleport: |1⟩
    circuit.h(q[1]).unwrap(); // entangle q1, q2
    circuit.cx(q[1], q[2]).unwrap();
    circuit.cx(q[0], q[1]).unwrap(); // Bell measurement on q0, q1
    circuit.h(q[0]).unwrap();
    circuit.measure(q[0], m0[0]).unwrap();
    circuit.measure(q[1], m1[0]).unwrap();
    circuit
        .gate_if(StandardGate::X, [q[2]], ClassicalCondition::new("m1", 1))
        .unwrap();
    circuit
        .gate_if(StandardGate::Z, [q[2]], ClassicalCondition::new("m0", 1))
        .unwrap();
    circuit.measure(q[2], out[0]).unwrap();

    let backend = QasmBackend::new().with_seed(42);
    let job_id = backend.submit(&circuit, 128, None).await.unwrap();
    let counts = backend.result(&job_id).await.unwrap().counts;

    // The out register (leftmost group) must always read 1.
    assert_eq!(counts.total(), 128);
    for (bitstring, _) in counts.iter() {
        assert!(bitstring.starts_with('1'), "unexpected outcome {bitstring}");
    }
}

#[tokio::test]
async fn validate_accepts_what_submit_accepts() {
    let provider = LocalProvider::new();
    let backend = provider.get_backend(QASM_SIMULATOR).unwrap();

    let circuit = Circuit::bell().unwrap();
    assert!(backend.validate(&circuit).await.unwrap().is_valid());

    let wide = Circuit::with_size("wide", 64, 0);
    assert!(!backend.validate(&wide).await.unwrap().is_valid());
}
