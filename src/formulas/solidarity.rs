/// Consciousness transmitted along one solidarity edge: `σ(Ψs − Ψt)`.
///
/// A hard gate: a source below `activation_threshold` transmits exactly zero,
/// however strong the edge.
pub fn solidarity_transmission(
    source_consciousness: f64,
    target_consciousness: f64,
    solidarity_strength: f64,
    activation_threshold: f64,
) -> f64 {
    if source_consciousness < activation_threshold || solidarity_strength <= 0.0 {
        return 0.0;
    }
    solidarity_strength * (source_consciousness - target_consciousness)
}
