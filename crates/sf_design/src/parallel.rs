use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::Annealer;
use crate::CancelToken;
use crate::DesignConfig;
use crate::DesignError;
use crate::DesignResult;
use crate::Folder;
use crate::MotifRules;

/// Run `runs` independent designs in parallel.
///
/// Every run gets its own folder from `make_folder` and its own random
/// stream; with a configured seed `s`, run `k` is seeded with `s + k`.
/// All runs share `cancel`. The results are in run order, `Ok(None)` for
/// runs that were cancelled before they produced a sequence.
pub fn design_many<F, M>(
    config: &DesignConfig,
    runs: usize,
    make_folder: M,
    cancel: &CancelToken,
) -> Vec<Result<Option<DesignResult>, DesignError>>
where
    F: Folder,
    M: Fn(usize) -> F + Sync,
{
    (0..runs)
        .into_par_iter()
        .map(|run| {
            let mut rng = match config.seed {
                Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(run as u64)),
                None => StdRng::from_os_rng(),
            };
            let mut annealer = Annealer::new(
                config.clone(),
                MotifRules::default(),
                make_folder(run),
                cancel.clone(),
            )?;
            let Some(sequence) = annealer.design(&mut rng) else {
                log::info!("Run {} cancelled.", run);
                return Ok(None);
            };
            let result = DesignResult::evaluate(&mut annealer, &sequence)?;
            log::info!("Run {} finished with score {}.", run, result.score);
            Ok(Some(result))
        })
        .collect()
}
