use rand::SeedableRng;
use rand::rngs::StdRng;

use trigen_core::io;
use trigen_core::model::trigram_model::TrigramModel;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // The model consumes an already-decoded text string; loading the
    // corpus (and handling a missing file) happens out here
    let text = match io::read_corpus("./data/corpus.txt") {
        Ok(text) => text,
        Err(_) => {
            eprintln!("./data/corpus.txt not found. Please provide a corpus in ./data and try again.");
            return Ok(());
        }
    };

    // Words seen at most once in the corpus are collapsed into the
    // unknown marker; raise the threshold for noisier corpora
    let mut model = TrigramModel::with_unk_threshold(1);

    // Fitting discards any prior tables, so one instance can be refitted
    model.fit(&text);
    println!("Vocabulary size: {}", model.vocab().len());

    // Generate 10 sequences of at most 50 words each
    for i in 0..10 {
        println!("Generated text {}: {}", i + 1, model.generate(50));
    }

    // A seeded random source makes a draw reproducible
    let mut rng = StdRng::seed_from_u64(42);
    println!("Seeded generation: {}", model.generate_with(&mut rng, 50));

    Ok(())
}
