use itertools::Itertools;
use sf_structure::normalize_brackets;
use sf_structure::MotifKind;
use sf_structure::MotifTree;
use sf_structure::PairTable;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let Some(structure) = args.next() else {
        eprintln!("usage: list_motifs <structure> [sequence]");
        std::process::exit(2);
    };
    let structure = normalize_brackets(&structure);
    let sequence = args.next().unwrap_or_else(|| "N".repeat(structure.len()));

    let tree = MotifTree::build(&structure, &sequence)?;
    let pairs = PairTable::try_from(structure.as_str())?.pair_count();
    println!("{}", structure);
    println!("{}", tree.shapiro());
    println!(
        "{} pairs; {} stems, {} hairpins, {} bulges, {} interior, {} multiloops",
        pairs,
        tree.count(MotifKind::Stem),
        tree.count(MotifKind::Hairpin),
        tree.count(MotifKind::Bulge),
        tree.count(MotifKind::Internal),
        tree.count(MotifKind::Multiloop),
    );
    println!("{}", tree.motif_specs().iter().map(|m| m.to_string()).join(" "));
    for (index, motif) in tree.motifs().enumerate().skip(1) {
        let kind = format!("{:?}", motif.kind);
        println!("{:>3} {:<10} {:>3} {}", index, kind, motif.size, motif.substring);
    }
    Ok(())
}
