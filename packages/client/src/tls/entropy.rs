//! Best-effort supplemental seeding of the TLS random source
//!
//! A block read from the system entropy device seeds a generator whose
//! stream is XORed over the platform RNG output. Each seeded context owns its
//! own generator; rustls wants the provider's random source as a `'static`
//! reference, so one is leaked per context build. Failing to read the device
//! only means the provider's own random source is used.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use ring::digest;
use rustls::crypto::{CryptoProvider, GetRandomFailed, SecureRandom};
use zeroize::Zeroizing;

pub const DEFAULT_ENTROPY_DEVICE: &str = "/dev/urandom";
pub const SEED_BLOCK_LEN: usize = 1024;

/// Platform randomness mixed with a generator seeded from the entropy device.
pub struct SupplementalRandom {
    system: ring::rand::SystemRandom,
    stream: Mutex<StdRng>,
}

impl SupplementalRandom {
    fn new(seed: [u8; 32]) -> Self {
        Self {
            system: ring::rand::SystemRandom::new(),
            stream: Mutex::new(StdRng::from_seed(seed)),
        }
    }

}

impl fmt::Debug for SupplementalRandom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupplementalRandom").finish_non_exhaustive()
    }
}

impl SecureRandom for SupplementalRandom {
    fn fill(&self, buf: &mut [u8]) -> Result<(), GetRandomFailed> {
        ring::rand::SecureRandom::fill(&self.system, buf).map_err(|_| GetRandomFailed)?;

        let mut stream = match self.stream.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let mut mask = [0u8; 64];
        for chunk in buf.chunks_mut(mask.len()) {
            stream.fill_bytes(&mut mask[..chunk.len()]);
            for (byte, m) in chunk.iter_mut().zip(mask.iter()) {
                *byte ^= m;
            }
        }
        Ok(())
    }
}

/// Random source selected for one TLS context.
#[derive(Debug, Clone, Copy)]
pub enum RandomSource {
    Seeded(&'static SupplementalRandom),
    /// The crypto provider's own source
    Default,
}

impl RandomSource {
    #[must_use]
    pub fn is_seeded(&self) -> bool {
        matches!(self, RandomSource::Seeded(_))
    }

    /// Provider drawing its randomness from this source.
    #[must_use]
    pub fn apply(self, provider: Arc<CryptoProvider>) -> Arc<CryptoProvider> {
        match self {
            RandomSource::Seeded(random) => {
                let mut seeded = (*provider).clone();
                seeded.secure_random = random;
                Arc::new(seeded)
            }
            RandomSource::Default => provider,
        }
    }
}

/// Reads one seed block from an entropy device.
#[derive(Debug, Clone)]
pub struct EntropySeeder {
    device: PathBuf,
}

impl Default for EntropySeeder {
    fn default() -> Self {
        Self::new(DEFAULT_ENTROPY_DEVICE)
    }
}

impl EntropySeeder {
    pub fn new(device: impl Into<PathBuf>) -> Self {
        Self {
            device: device.into(),
        }
    }

    #[must_use]
    pub fn device(&self) -> &Path {
        &self.device
    }

    /// Seed a fresh supplemental generator, never failing.
    ///
    /// Any problem reading the device is logged as a warning and yields
    /// [`RandomSource::Default`].
    #[must_use]
    pub fn try_seed(&self) -> RandomSource {
        let mut block = Zeroizing::new([0u8; SEED_BLOCK_LEN]);
        let read = File::open(&self.device).and_then(|mut device| device.read_exact(&mut block[..]));

        if let Err(err) = read {
            tracing::warn!(
                device = %self.device.display(),
                error = %err,
                "entropy seeding unavailable, using default initialization"
            );
            return RandomSource::Default;
        }

        let mut seed = [0u8; 32];
        seed.copy_from_slice(digest::digest(&digest::SHA256, &block[..]).as_ref());

        let random: &'static SupplementalRandom = Box::leak(Box::new(SupplementalRandom::new(seed)));
        tracing::debug!(device = %self.device.display(), "random source seeded");
        RandomSource::Seeded(random)
    }
}
