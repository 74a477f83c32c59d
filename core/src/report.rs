use std::{fs::File, io::BufWriter, path::Path};

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One evaluation of the energy oracle during an optimization
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IterationInfo {
    /// position of the moving atom, in Ångström
    pub coords: Vector3<f64>,
    /// total energy in Hartree
    pub energy: f64,
    /// change with respect to the previously reported energy, `None` for the first report.
    /// Filled in by the optimizer; observers pass it on unchanged.
    pub delta: Option<f64>,
    /// whether the optimizer moved to this geometry
    pub accepted: bool,
}

/// Receives every oracle evaluation an optimizer performs. Observers only watch; they can't
/// influence the optimizer.
pub trait Observer {
    fn on_evaluation(&mut self, info: &IterationInfo);
}

impl Observer for () {
    fn on_evaluation(&mut self, _info: &IterationInfo) {}
}

impl<F: FnMut(&IterationInfo)> Observer for F {
    fn on_evaluation(&mut self, info: &IterationInfo) {
        self(info)
    }
}

/// Logs one line per evaluation
#[derive(Debug, Default)]
pub struct LogReporter {
    evaluations: usize,
}

impl LogReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Observer for LogReporter {
    fn on_evaluation(&mut self, info: &IterationInfo) {
        self.evaluations += 1;

        let (x, y, z) = (info.coords.x, info.coords.y, info.coords.z);
        log::info!(
            "evaluation {:<4} - ({x:>8.4}, {y:>8.4}, {z:>8.4}) energy {:1.8} delta {} {}",
            self.evaluations,
            info.energy,
            info.delta.map_or_else(|| "-".to_owned(), |delta| format!("{delta:+1.3e}")),
            if info.accepted { "accepted" } else { "rejected" }
        );
    }
}

/// Collects the full trajectory of an optimization
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TrajectoryRecorder {
    evaluations: Vec<IterationInfo>,
}

impl TrajectoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn evaluations(&self) -> &[IterationInfo] {
        &self.evaluations
    }

    /// Only the evaluations the optimizer moved to, in order
    pub fn accepted(&self) -> impl Iterator<Item = &IterationInfo> {
        self.evaluations.iter().filter(|info| info.accepted)
    }

    pub fn len(&self) -> usize {
        self.evaluations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.evaluations.is_empty()
    }

    /// Writes the trajectory as json
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::options()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }
}

impl Observer for TrajectoryRecorder {
    fn on_evaluation(&mut self, info: &IterationInfo) {
        self.evaluations.push(*info);
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::Vector3;

    use super::{IterationInfo, LogReporter, Observer, TrajectoryRecorder};

    fn info(z: f64, energy: f64, accepted: bool) -> IterationInfo {
        IterationInfo {
            coords: Vector3::new(0.0, 0.0, z),
            energy,
            delta: None,
            accepted,
        }
    }

    #[test]
    fn recorder_keeps_reported_values() {
        let stream = [
            info(1.0, -1.0, true),
            IterationInfo {
                delta: Some(-0.2),
                ..info(1.1, -1.2, true)
            },
            IterationInfo {
                delta: Some(0.1),
                ..info(1.2, -1.1, false)
            },
        ];

        let mut recorder = TrajectoryRecorder::new();
        let mut logger = LogReporter::new();
        for info in &stream {
            logger.on_evaluation(info);
            recorder.on_evaluation(info);
        }

        assert_eq!(recorder.evaluations(), &stream);
        assert_eq!(recorder.accepted().count(), 2);
    }

    #[test]
    fn saves_json() {
        let mut recorder = TrajectoryRecorder::new();
        recorder.on_evaluation(&info(0.5, -0.9, true));

        let path = std::env::temp_dir().join(format!("trajectory-{}.json", std::process::id()));
        recorder.save(&path).unwrap();

        let loaded: TrajectoryRecorder =
            serde_json::from_reader(std::fs::File::open(&path).unwrap()).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(loaded.evaluations(), recorder.evaluations());
    }

    #[test]
    fn closures_observe() {
        let mut energies = Vec::new();
        let mut observer = |info: &IterationInfo| energies.push(info.energy);
        observer.on_evaluation(&info(0.0, -0.5, false));
        assert_eq!(energies, vec![-0.5]);
    }
}
