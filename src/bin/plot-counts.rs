use chromoseq::genome::{ChromosomeReader, Decoded, ALPHABET, AMINO_ACID_COUNT};
use chromoseq::logging::init_tracing;
use chromoseq::pipeline::{Admission, AminoOutcome};
use chromoseq::{Conductor, ConductorConfig};
use plotters::prelude::*;

struct Args {
    genome_path: String,
    max_aminos: u64,
    output_path: String,
}

struct Tally {
    counts: [u64; AMINO_ACID_COUNT],
    /// Running share of coding amino acids that opened or extended a chain
    coding_share: Vec<(f32, f32)>,
    queued: usize,
    dropped: usize,
}

fn print_usage() {
    eprintln!("Usage: plot-counts <genome.fa> <max_aminos> <output.svg>");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  plot-counts chr21.fa 100000 counts.svg");
}

fn parse_args() -> Result<Args, Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();

    if args.len() != 4 {
        print_usage();
        return Err("Invalid number of arguments".into());
    }

    let max_aminos: u64 = args[2].parse()?;
    if max_aminos == 0 {
        return Err("max_aminos must be positive".into());
    }

    Ok(Args {
        genome_path: args[1].clone(),
        max_aminos,
        output_path: args[3].clone(),
    })
}

fn tally(args: &Args) -> Result<Tally, Box<dyn std::error::Error>> {
    let config = ConductorConfig::default();
    let mut reader = ChromosomeReader::open(&args.genome_path, config.chunk_size)?;
    let mut conductor = Conductor::new(config);

    let sample_every = (args.max_aminos / 200).max(1);
    let mut coding_share = Vec::new();
    let mut in_frame = 0u64;
    let mut queued = 0;
    let mut dropped = 0;

    let mut read = 0u64;
    while read < args.max_aminos {
        let aa = match reader.next_amino()? {
            Decoded::Amino(aa) => aa,
            Decoded::Exhausted => break,
        };
        read += 1;

        match conductor.add_amino(aa) {
            AminoOutcome::Started | AminoOutcome::Extended => in_frame += 1,
            AminoOutcome::Completed(Admission::Queued(..)) => queued += 1,
            AminoOutcome::Completed(Admission::Dropped(_)) => dropped += 1,
            AminoOutcome::Ignored => {}
        }

        if read % sample_every == 0 {
            coding_share.push((read as f32, in_frame as f32 / read as f32));
        }
    }

    if read == 0 {
        return Err(format!("{} holds no codons", args.genome_path).into());
    }

    Ok(Tally {
        counts: *conductor.amino_acid_counts(),
        coding_share,
        queued,
        dropped,
    })
}

fn create_plot(args: &Args, tally: &Tally) -> Result<(), Box<dyn std::error::Error>> {
    let root = SVGBackend::new(&args.output_path, (900, 700)).into_drawing_area();
    root.fill(&WHITE)?;
    let (upper, lower) = root.split_vertically(450);

    let max_count = tally.counts.iter().copied().max().unwrap_or(0).max(1) as f32;

    let title = format!(
        "Amino acids: {} (sequences queued={}, dropped={})",
        args.genome_path, tally.queued, tally.dropped
    );

    let mut chart = ChartBuilder::on(&upper)
        .caption(&title, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0f32..AMINO_ACID_COUNT as f32, 0f32..max_count * 1.1)?;

    chart
        .configure_mesh()
        .x_desc("Amino acid")
        .y_desc("Occurrences")
        .x_labels(AMINO_ACID_COUNT)
        .x_label_formatter(&|x| {
            ALPHABET
                .get(*x as usize)
                .map(|aa| aa.one_letter().to_string())
                .unwrap_or_default()
        })
        .y_labels(10)
        .draw()?;

    chart.draw_series(tally.counts.iter().enumerate().map(|(i, &count)| {
        let x = i as f32;
        Rectangle::new([(x + 0.15, 0.0), (x + 0.85, count as f32)], BLUE.filled())
    }))?;

    let max_read = tally.coding_share.last().map(|&(x, _)| x).unwrap_or(1.0);
    let mut share_chart = ChartBuilder::on(&lower)
        .caption("Share of amino acids inside reading frames", ("sans-serif", 16))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0f32..max_read, 0f32..1f32)?;

    share_chart
        .configure_mesh()
        .x_desc("Amino acids read")
        .y_desc("Share")
        .x_labels(10)
        .y_labels(5)
        .draw()?;

    share_chart.draw_series(LineSeries::new(
        tally.coding_share.iter().copied(),
        RED.stroke_width(2),
    ))?;

    root.present()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = parse_args()?;
    init_tracing();

    println!("Amino Acid Histogram");
    println!("====================");
    println!("  Genome: {}", args.genome_path);
    println!("  Limit: {} amino acids", args.max_aminos);
    println!();

    print!("  Decoding... ");
    let tally = tally(&args)?;
    let total: u64 = tally.counts.iter().sum();
    println!("done ({} coding amino acids counted)", total);

    for (aa, count) in ALPHABET.iter().zip(tally.counts.iter()) {
        println!("  {} {:>10}", aa, count);
    }

    print!("  Creating plot... ");
    create_plot(&args, &tally)?;
    println!("done");

    println!();
    println!("Output: {}", args.output_path);

    Ok(())
}
