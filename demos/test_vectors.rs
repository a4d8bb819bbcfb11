use astrobwt::{compute_pow, sort};
use serde::Serialize;

const TRANSFORM_VECTORS_INPUT: [&str; 4] = ["BANANA", "abracadabra", "appellee", "GATGCGAGAGATG"];
const POW_VECTORS_INPUT: [&str; 3] = ["", "abc", "The quick brown fox jumps over the lazy dog"];
const TEST_VECTOR_OUTPUT_FILE: &str = "test_vectors/astrobwt_test_vectors.json";

#[derive(Serialize)]
struct TransformVector {
    input: String,
    output: String,
    sentinel: usize,
}

#[derive(Serialize)]
struct PowVector {
    input: String,
    output: String,
}

#[derive(Serialize)]
struct TestVectors {
    transform: Vec<TransformVector>,
    pow: Vec<PowVector>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Generating test vectors...");
    let transform = TRANSFORM_VECTORS_INPUT
        .iter()
        .map(|input| {
            let bwt = sort::transform(input.as_bytes())?;
            Ok(TransformVector {
                input: hex::encode(input.as_bytes()),
                output: hex::encode(&bwt.output),
                sentinel: bwt.sentinel,
            })
        })
        .collect::<Result<Vec<_>, astrobwt::AstroBwtError>>()?;
    let pow = POW_VECTORS_INPUT
        .iter()
        .map(|input| PowVector {
            input: hex::encode(input.as_bytes()),
            output: hex::encode(compute_pow(input.as_bytes())),
        })
        .collect::<Vec<_>>();

    // Convert the test vectors to a json object, pretty print it
    let test_vectors_json = serde_json::to_string_pretty(&TestVectors { transform, pow })?;
    println!("{}", test_vectors_json);
    std::fs::create_dir_all("test_vectors")?;
    std::fs::write(TEST_VECTOR_OUTPUT_FILE, test_vectors_json)?;
    println!("Test vectors written to {}", TEST_VECTOR_OUTPUT_FILE);
    Ok(())
}
