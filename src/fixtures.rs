use rsa::RsaPrivateKey;
use std::sync::LazyLock;

// Small keys keep key generation fast in debug builds. Never use this size outside of tests.
const TEST_KEY_BITS: usize = 1024;

pub(crate) static PRIVATE_KEY: LazyLock<RsaPrivateKey> = LazyLock::new(generate_key);

pub(crate) static OTHER_PRIVATE_KEY: LazyLock<RsaPrivateKey> = LazyLock::new(generate_key);

fn generate_key() -> RsaPrivateKey {
    RsaPrivateKey::new(&mut rand::thread_rng(), TEST_KEY_BITS).expect("key generation failed")
}
