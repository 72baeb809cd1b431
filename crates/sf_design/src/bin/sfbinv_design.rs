use sf_design::design_many;
use sf_design::CancelToken;
use sf_design::DesignConfig;
use sf_design::RnaFold;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (path, runs) = match args.as_slice() {
        [path] => (path, 1),
        [path, runs] => (path, runs.parse::<usize>()?),
        _ => {
            eprintln!("usage: sfbinv_design <config.json> [runs]");
            std::process::exit(2);
        }
    };

    let config = DesignConfig::from_json(&std::fs::read_to_string(path)?)?;
    log::info!("Designing {} x {}", runs, config.target_structure);

    let vienna_dir = config.folder.vienna_dir.clone();
    let circular = config.circular;
    let cancel = CancelToken::new();
    let make_folder = |_run: usize| RnaFold::new(vienna_dir.clone(), circular);
    let results = design_many(&config, runs, make_folder, &cancel);

    for (run, result) in results.into_iter().enumerate() {
        match result? {
            Some(result) => println!("Run {}:\n{}\n", run, result),
            None => println!("Run {}: cancelled\n", run),
        }
    }
    Ok(())
}
