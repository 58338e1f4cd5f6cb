use crate::prompts::identity_prompt;
use crate::{bounded, TextGenerator};
use inkdeck_core::{
    frequency_identity, ink_distribution, parse_identity_reply, samples_by_ink, CardCandidate,
    Identity, IdentitySource,
};
use tracing::{info, warn};

/// Asks the generator to arbitrate the pool's ink distribution. Any failure
/// or invalid reply falls back to the two most frequent inks.
pub async fn select_identity(
    request: &str,
    pool: &[CardCandidate],
    generator: Option<&dyn TextGenerator>,
    samples_per_ink: usize,
    timeout_ms: u64,
) -> Option<(Identity, IdentitySource)> {
    if let Some(generator) = generator {
        let distribution = ink_distribution(pool);
        let samples = samples_by_ink(pool, samples_per_ink);
        let prompt = identity_prompt(request, &distribution, &samples);
        match bounded(timeout_ms, generator.generate(&prompt)).await {
            Ok(reply) => match parse_identity_reply(&reply) {
                Ok(identity) => {
                    info!(identity = %identity.label(), "identity suggested by generator");
                    return Some((identity, IdentitySource::Generated));
                }
                Err(err) => warn!(error = %err, "identity reply rejected, using ink frequency"),
            },
            Err(err) => warn!(error = %err, "identity generation failed, using ink frequency"),
        }
    }
    let identity = frequency_identity(pool)?;
    info!(identity = %identity.label(), "identity picked by ink frequency");
    Some((identity, IdentitySource::Frequency))
}
