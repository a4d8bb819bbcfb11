use astrobwt::{compute_pow, compute_pow_bounded, Arena, ArenaPool, PowConfig, STAGE1_LENGTH};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), astrobwt::AstroBwtError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let input = "Hello, world!";
    let hash = compute_pow(input.as_bytes());
    println!("Input: {}", input);
    println!("Input hex: {}", hex::encode(input.as_bytes()));
    println!("Hash: {}", hex::encode(hash));

    let input2 = "Hello, world";
    let hash2 = compute_pow(input2.as_bytes());
    println!("Input 2: {}", input2);
    println!("Input 2 hex: {}", hex::encode(input2.as_bytes()));
    println!("Hash 2: {}", hex::encode(hash2));

    // A miner that only accepts short second stages
    let pool = ArenaPool::new(PowConfig::bounded(STAGE1_LENGTH + 0x40000))?;
    println!("Stage-2 limit: {}", pool.config().max_stage2_length);
    for nonce in 0u32..8 {
        let candidate = [input.as_bytes(), &nonce.to_le_bytes()].concat();
        match pool.hash(&candidate) {
            Ok(digest) => println!("nonce {nonce}: {}", hex::encode(digest)),
            Err(rejected) => println!("nonce {nonce}: skipped ({rejected})"),
        }
    }

    // Same candidate, caller-owned arena
    let mut arena = Arena::new();
    let limit = pool.config().max_stage2_length;
    if let Ok(digest) = compute_pow_bounded(input.as_bytes(), limit, &mut arena) {
        println!("bounded {}: {}", input, hex::encode(digest));
    }
    Ok(())
}
