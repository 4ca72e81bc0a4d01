use chromoseq::control::{Command, Reply, Session};
use chromoseq::logging::init_tracing;
use chromoseq::pipeline::SizeClass;
use chromoseq::{ChromosomeReader, Conductor, ConductorConfig};

/// Codons cycled through the body of each demo gene
const BODY_CODONS: [&str; 8] = ["GCC", "GAT", "TTC", "AAA", "CTG", "CCG", "TCT", "GTG"];

/// Build a FASTA fragment with one gene per requested length
///
/// Genes are separated by a run of `N` so an unreadable stretch sits
/// between them, the way assemblies mark gaps.
fn demo_genome(gene_lengths: &[usize]) -> String {
    let mut text = String::from(">demo fragment\n");
    for (g, &len) in gene_lengths.iter().enumerate() {
        text.push_str("ATG");
        for i in 0..len {
            text.push_str(BODY_CODONS[(i + g) % BODY_CODONS.len()]);
        }
        text.push_str("TAA");
        text.push_str("NNNNNNNNNN\n");
    }
    text
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    println!("\n=== Chromosome Sequencer Demo ===\n");

    let config = ConductorConfig::default();
    // One gene per class plus one too short for any
    let genome = demo_genome(&[40, 100, 130, 160]);

    println!("Configuration:");
    for class in SizeClass::ALL {
        let group = config.group(class);
        println!(
            "  {:<6} {} slots, {}-step cycle, chains longer than {}",
            class, group.capacity, group.size, group.length_threshold
        );
    }
    println!();

    let reader = ChromosomeReader::from_text("demo", &genome, config.chunk_size)?;
    let mut session = Session::new(reader, Conductor::new(config));

    let ready = session.execute(&Command::Read(u32::MAX))?;
    println!("Decoded: {}", ready);
    for class in SizeClass::ALL {
        println!(
            "  {:<6} pending: {}",
            class,
            session.conductor().group(class).pending_count()
        );
    }
    println!();

    // Two bars of the medium cycle
    for step in 0..64 {
        if let Reply::Events(events) = session.execute(&Command::Step(step))? {
            if events.is_empty() {
                continue;
            }
            let notes: Vec<String> = events
                .iter()
                .map(|e| format!("ch{}:{}", e.channel, e.pitch))
                .collect();
            println!("step {:>2}: {}", step, notes.join(" "));
        }
    }

    println!();
    println!("{}", session.execute(&Command::AminoCounts)?);

    Ok(())
}
