//! Structure prediction and inverse folding.
//!
//! The designer only needs two oracles: predicting the structure of a
//! sequence and proposing a sequence for a structure. `RnaFold` provides
//! both by driving the ViennaRNA executables. Folding keeps a single
//! `RNAfold -p` process alive and feeds it one sequence at a time.

use std::io::BufRead;
use std::io::BufReader;
use std::io::Write;
use std::path::PathBuf;
use std::process::Child;
use std::process::ChildStdin;
use std::process::ChildStdout;
use std::process::Command;
use std::process::Stdio;
use serde::Deserialize;
use serde::Serialize;

use crate::FoldError;

/// Which predicted structure represents a sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FoldMethod {
    #[default]
    Mfe,
    Centroid,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub structure: String,
    pub energy: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FoldResult {
    pub mfe: Prediction,
    pub centroid: Prediction,
}

impl FoldResult {
    pub fn get(&self, method: FoldMethod) -> &Prediction {
        match method {
            FoldMethod::Mfe => &self.mfe,
            FoldMethod::Centroid => &self.centroid,
        }
    }
}

/// A structure prediction oracle. Circularity and similar model settings
/// are properties of the implementing instance.
pub trait Folder {
    fn fold(&mut self, sequence: &str, constraint: Option<&str>) -> Result<FoldResult, FoldError>;

    /// Find a sequence folding into `structure`. The seed uses lower case
    /// letters for fixed bases and `N` for free positions.
    fn inverse_fold(&mut self, structure: &str, seed: &str) -> Result<String, FoldError>;
}

impl<F: Folder + ?Sized> Folder for Box<F> {
    fn fold(&mut self, sequence: &str, constraint: Option<&str>) -> Result<FoldResult, FoldError> {
        (**self).fold(sequence, constraint)
    }

    fn inverse_fold(&mut self, structure: &str, seed: &str) -> Result<String, FoldError> {
        (**self).inverse_fold(structure, seed)
    }
}

/// The last line `RNAfold -p` prints for every input.
const END_OF_RECORD: &str = "ensemble diversity";

const RNAFOLD: &str = "RNAfold";
const RNAINVERSE: &str = "RNAinverse";

struct LiveProcess {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

/// ViennaRNA `RNAfold` / `RNAinverse`.
pub struct RnaFold {
    vienna_dir: Option<PathBuf>,
    circular: bool,
    live: Option<LiveProcess>,
}

impl RnaFold {
    /// Executables are looked up in `vienna_dir`, or on `PATH` if `None`.
    pub fn new(vienna_dir: Option<PathBuf>, circular: bool) -> Self {
        Self {
            vienna_dir,
            circular,
            live: None,
        }
    }

    fn program(&self, name: &str) -> PathBuf {
        match &self.vienna_dir {
            Some(dir) => dir.join(name),
            None => PathBuf::from(name),
        }
    }

    fn rnafold_command(&self) -> Command {
        let mut command = Command::new(self.program(RNAFOLD));
        command.args(["-p", "--noPS"]);
        if self.circular {
            command.arg("-c");
        }
        command
    }

    fn constrained_command(&self) -> Command {
        let mut command = self.rnafold_command();
        command.arg("-C");
        command
    }

    fn spawn(mut command: Command) -> Result<Child, FoldError> {
        let program = command.get_program().to_string_lossy().into_owned();
        log::debug!("Starting {:?}.", command);
        command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| FoldError::Spawn { program, source })
    }

    fn live(&mut self) -> Result<&mut LiveProcess, FoldError> {
        if self.live.is_none() {
            let mut child = Self::spawn(self.rnafold_command())?;
            let stdin = child.stdin.take().ok_or(FoldError::Closed)?;
            let stdout = child.stdout.take().ok_or(FoldError::Closed)?;
            self.live = Some(LiveProcess {
                child,
                stdin,
                stdout: BufReader::new(stdout),
            });
        }
        self.live.as_mut().ok_or(FoldError::Closed)
    }

    /// One request on the live process, dropping the process on failure
    /// so that the next request starts a fresh one.
    fn fold_live(&mut self, sequence: &str) -> Result<FoldResult, FoldError> {
        let reply = self.live().and_then(|process| {
            writeln!(process.stdin, "{}", sequence)?;
            process.stdin.flush()?;
            read_record(&mut process.stdout)
        });
        if reply.is_err() {
            self.close();
        }
        parse_fold_output(&reply?)
    }

    /// Constrained folding uses a one-shot process (`-C`).
    fn fold_constrained(&self, sequence: &str, constraint: &str) -> Result<FoldResult, FoldError> {
        let mut child = Self::spawn(self.constrained_command())?;
        let mut stdin = child.stdin.take().ok_or(FoldError::Closed)?;
        stdin.write_all(constrained_request(sequence, constraint).as_bytes())?;
        drop(stdin);
        let output = child.wait_with_output()?;
        let text = String::from_utf8_lossy(&output.stdout);
        let lines: Vec<String> = text.lines().map(str::to_string).collect();
        parse_fold_output(&lines)
    }

    fn close(&mut self) {
        if let Some(mut process) = self.live.take() {
            log::debug!("Closing {}.", RNAFOLD);
            let _ = process.stdin.write_all(b"@\n");
            let _ = process.stdin.flush();
            let _ = process.child.kill();
            let _ = process.child.wait();
        }
    }
}

impl Drop for RnaFold {
    fn drop(&mut self) {
        self.close();
    }
}

impl Folder for RnaFold {
    fn fold(&mut self, sequence: &str, constraint: Option<&str>) -> Result<FoldResult, FoldError> {
        log::trace!("Folding {}.", sequence);
        match constraint {
            Some(constraint) => self.fold_constrained(sequence, constraint),
            None => self.fold_live(sequence),
        }
    }

    fn inverse_fold(&mut self, structure: &str, seed: &str) -> Result<String, FoldError> {
        let mut child = Self::spawn(Command::new(self.program(RNAINVERSE)))?;
        let mut stdin = child.stdin.take().ok_or(FoldError::Closed)?;
        write!(stdin, "{}\n{}\n@\n", structure, seed)?;
        drop(stdin);
        let output = child.wait_with_output()?;
        let text = String::from_utf8_lossy(&output.stdout);
        parse_inverse_output(&text, structure.len())
    }
}

/// Sequence, constraint and the quit marker, one per line.
fn constrained_request(sequence: &str, constraint: &str) -> String {
    format!("{}\n{}\n@\n", sequence, constraint)
}

/// Read lines up to and including the end-of-record line.
fn read_record<R: BufRead>(reader: &mut R) -> Result<Vec<String>, FoldError> {
    let mut lines = Vec::new();
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            return Err(FoldError::Closed);
        }
        let line = line.trim_end().to_string();
        let done = line.contains(END_OF_RECORD);
        lines.push(line);
        if done {
            return Ok(lines);
        }
    }
}

/// Parse `<structure> (<energy>)` or `<structure> {<energy> d=...}`.
fn parse_prediction(line: &str) -> Result<Prediction, FoldError> {
    let invalid = || FoldError::Parse(line.to_string());
    let line = line.trim();
    let split = line.find(char::is_whitespace).ok_or_else(invalid)?;
    let (structure, rest) = line.split_at(split);
    if structure.is_empty() || !structure.chars().all(|c| matches!(c, '.' | '(' | ')')) {
        return Err(invalid());
    }
    let energy = rest
        .trim()
        .trim_start_matches(['(', '{', '['])
        .trim_start()
        .split(|c: char| c.is_whitespace() || matches!(c, ')' | '}' | ']'))
        .next()
        .ok_or_else(invalid)?
        .parse::<f64>()
        .map_err(|_| invalid())?;
    Ok(Prediction {
        structure: structure.to_string(),
        energy,
    })
}

/// Line 1 holds the MFE structure and line 3 the centroid structure.
fn parse_fold_output(lines: &[String]) -> Result<FoldResult, FoldError> {
    let line = |k: usize| {
        lines
            .get(k)
            .ok_or_else(|| FoldError::Parse(format!("missing line {} in {:?}", k, lines)))
    };
    Ok(FoldResult {
        mfe: parse_prediction(line(1)?)?,
        centroid: parse_prediction(line(3)?)?,
    })
}

fn parse_inverse_output(text: &str, length: usize) -> Result<String, FoldError> {
    let sequence = text
        .lines()
        .filter_map(|l| l.split_whitespace().next())
        .next()
        .map(str::to_ascii_uppercase)
        .ok_or_else(|| FoldError::Inverse(text.to_string()))?;
    if sequence.len() != length || !sequence.chars().all(|c| "ACGU".contains(c)) {
        return Err(FoldError::Inverse(text.to_string()));
    }
    Ok(sequence)
}

/// Seed for inverse folding: definite bases of the target sequence are
/// kept (lower case marks them as fixed), everything else becomes `N`.
pub fn inverse_seed(target_sequence: &str) -> String {
    target_sequence
        .chars()
        .map(|c| match c.to_ascii_uppercase() {
            b @ ('A' | 'C' | 'G' | 'U') => b.to_ascii_lowercase(),
            'T' => 'u',
            _ => 'N',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const OUTPUT: &str = "GGGGAAAACCCC
((((....)))) ( -5.50)
((((....)))) [ -5.74]
((((....)))) { -5.50 d=0.34}
 frequency of mfe structure in ensemble 0.67; ensemble diversity 0.55
";

    #[test]
    fn test_parse_fold_output() {
        let lines = read_record(&mut Cursor::new(OUTPUT)).unwrap();
        assert_eq!(lines.len(), 5);
        let result = parse_fold_output(&lines).unwrap();
        assert_eq!(result.mfe.structure, "((((....))))");
        assert_eq!(result.mfe.energy, -5.5);
        assert_eq!(result.centroid.energy, -5.5);
        assert_eq!(result.get(FoldMethod::Centroid).structure, "((((....))))");
    }

    #[test]
    fn test_constrained_request() {
        let folder = RnaFold::new(Some(PathBuf::from("/opt/vienna")), true);
        let command = folder.constrained_command();
        assert_eq!(command.get_program(), "/opt/vienna/RNAfold");
        let args: Vec<_> = command.get_args().collect();
        assert_eq!(args, ["-p", "--noPS", "-c", "-C"]);
        assert_eq!(
            constrained_request("GGGAAACCC", "(((...)))"),
            "GGGAAACCC\n(((...)))\n@\n"
        );
    }

    #[test]
    fn test_constrained_fold_spawns_rnafold() {
        let mut folder = RnaFold::new(Some(PathBuf::from("/nonexistent/vienna")), false);
        match folder.fold("GGGAAACCC", Some("(((...)))")) {
            Err(FoldError::Spawn { program, .. }) => assert!(program.ends_with("RNAfold")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_positive_and_unspaced_energy() {
        let p = parse_prediction("....... (  0.00)").unwrap();
        assert_eq!(p.energy, 0.0);
        let p = parse_prediction("((...)) (-12.30)").unwrap();
        assert_eq!(p.energy, -12.3);
        let p = parse_prediction("((...)) {1.10 d=2.00}").unwrap();
        assert_eq!(p.energy, 1.1);
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_prediction("((...))").is_err());
        assert!(parse_prediction("((.x.)) ( -1.0)").is_err());
        assert!(parse_prediction("((...)) ( abc)").is_err());
        assert!(parse_fold_output(&["ACGU".to_string()]).is_err());
    }

    #[test]
    fn test_truncated_record() {
        let err = read_record(&mut Cursor::new("GGGAAACCC\n(((...))) ( -1.00)\n")).unwrap_err();
        assert!(matches!(err, FoldError::Closed));
    }

    #[test]
    fn test_parse_inverse_output() {
        assert_eq!(parse_inverse_output("gggaaaccc   0\n", 9).unwrap(), "GGGAAACCC");
        assert!(parse_inverse_output("", 9).is_err());
        assert!(parse_inverse_output("GGGAAACC 2\n", 9).is_err());
    }

    #[test]
    fn test_inverse_seed() {
        assert_eq!(inverse_seed("ACGUNRY.t"), "acguNNNNu");
    }

    #[test]
    fn test_missing_executable() {
        let mut folder = RnaFold::new(Some(PathBuf::from("/nonexistent/vienna")), false);
        let err = folder.fold("GGGAAACCC", None).unwrap_err();
        assert!(matches!(err, FoldError::Spawn { .. }));
        assert!(folder.inverse_fold("(((...)))", "NNNNNNNNN").is_err());
    }
}
