//! Bundle codec - `.npz` archives of named arrays.
//!
//! Layout (all `float64`, `float32` is widened on read):
//!
//! | key          | shape  | required |
//! |--------------|--------|----------|
//! | `trajectory` | (N, 3) | yes      |
//! | `velocity`   | (N, 3) | yes      |
//! | `timesteps`  | (N,)   | yes      |
//! | `goal_traj`  | (N, 3) | no, defaults to the final position |
//! | `obstacles`  | (M, 4) | no, defaults to none |
//!
//! Members are written as `<key>.npy` like `numpy.savez` does, so bundles
//! open with `np.load` on the Python side. Readers accept the bare key too.

use crate::error::{Result, TrajectoryError};
use crate::footprint::Footprint;
use crate::store::{static_goal, TrajectoryStore};
use nalgebra::Vector3;
use ndarray::{Array2, ArrayD, Ix1, Ix2};
use ndarray_npy::{NpzReader, NpzWriter};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, Write};
use std::path::Path;
use tracing::{debug, info};

pub const TRAJECTORY_KEY: &str = "trajectory";
pub const VELOCITY_KEY: &str = "velocity";
pub const TIMESTEPS_KEY: &str = "timesteps";
pub const GOAL_KEY: &str = "goal_traj";
pub const OBSTACLES_KEY: &str = "obstacles";

/// Loads a trajectory from a bundle.
///
/// Fails with [`TrajectoryError::MissingRequiredField`] when `trajectory`,
/// `velocity` or `timesteps` is absent and with
/// [`TrajectoryError::ShapeMismatch`] when array shapes disagree.
pub fn load(path: impl AsRef<Path>) -> Result<TrajectoryStore> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let store = read_bundle(BufReader::new(file))?;

    info!(
        path = %path.display(),
        samples = store.sample_count(),
        duration = store.duration(),
        obstacles = store.obstacles().len(),
        "Loaded trajectory bundle"
    );
    Ok(store)
}

/// Saves all five fields to a bundle, replacing any file at `path`.
pub fn save(store: &TrajectoryStore, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = write_bundle(store, BufWriter::new(file))?;
    writer.flush()?;

    info!(
        path = %path.display(),
        samples = store.sample_count(),
        "Saved trajectory bundle"
    );
    Ok(())
}

/// Decodes a bundle from any seekable reader.
pub fn read_bundle<R: Read + Seek>(reader: R) -> Result<TrajectoryStore> {
    let mut npz = NpzReader::new(reader)?;
    let names = npz.names()?;

    let trajectory = match member(&names, TRAJECTORY_KEY) {
        Some(name) => read_points(&mut npz, name, TRAJECTORY_KEY)?,
        None => return Err(TrajectoryError::MissingRequiredField(TRAJECTORY_KEY)),
    };
    let velocity = match member(&names, VELOCITY_KEY) {
        Some(name) => read_points(&mut npz, name, VELOCITY_KEY)?,
        None => return Err(TrajectoryError::MissingRequiredField(VELOCITY_KEY)),
    };
    let timesteps = match member(&names, TIMESTEPS_KEY) {
        Some(name) => read_scalars(&mut npz, name, TIMESTEPS_KEY)?,
        None => return Err(TrajectoryError::MissingRequiredField(TIMESTEPS_KEY)),
    };

    let goal_traj = match member(&names, GOAL_KEY) {
        Some(name) => read_points(&mut npz, name, GOAL_KEY)?,
        None => {
            debug!("Bundle has no goal_traj, using a static goal at the final position");
            static_goal(&trajectory)?
        }
    };
    let obstacles = match member(&names, OBSTACLES_KEY) {
        Some(name) => read_footprints(&mut npz, name)?,
        None => {
            debug!("Bundle has no obstacles");
            Vec::new()
        }
    };

    TrajectoryStore::new(trajectory, velocity, timesteps, goal_traj, obstacles)
}

/// Encodes a bundle into any seekable writer and returns the writer.
pub fn write_bundle<W: Write + Seek>(store: &TrajectoryStore, writer: W) -> Result<W> {
    let mut npz = NpzWriter::new(writer);
    npz.add_array(member_file(TRAJECTORY_KEY), &points_array(store.trajectory()))?;
    npz.add_array(member_file(VELOCITY_KEY), &points_array(store.velocity()))?;
    npz.add_array(
        member_file(TIMESTEPS_KEY),
        &ndarray::Array1::from(store.timesteps().to_vec()),
    )?;
    npz.add_array(member_file(GOAL_KEY), &points_array(store.goal_traj()))?;
    npz.add_array(member_file(OBSTACLES_KEY), &footprints_array(store.obstacles()))?;
    Ok(npz.finish()?)
}

/// Archive member name for a key, as written by `numpy.savez`.
pub fn member_file(key: &str) -> String {
    format!("{}.npy", key)
}

fn member<'a>(names: &'a [String], key: &str) -> Option<&'a str> {
    names
        .iter()
        .find(|n| n.strip_suffix(".npy").unwrap_or(n.as_str()) == key)
        .map(String::as_str)
}

/// Reads a member as `f64`, falling back to `f32`.
fn read_dyn<R: Read + Seek>(npz: &mut NpzReader<R>, name: &str) -> Result<ArrayD<f64>> {
    match npz.by_name::<ndarray::OwnedRepr<f64>, ndarray::IxDyn>(name) {
        Ok(arr) => Ok(arr),
        Err(first) => match npz.by_name::<ndarray::OwnedRepr<f32>, ndarray::IxDyn>(name) {
            Ok(arr) => {
                debug!(member = name, "Widening float32 array");
                Ok(arr.mapv(f64::from))
            }
            Err(_) => Err(first.into()),
        },
    }
}

fn read_matrix<R: Read + Seek>(
    npz: &mut NpzReader<R>,
    name: &str,
    field: &'static str,
    cols: usize,
) -> Result<Array2<f64>> {
    let arr = read_dyn(npz, name)?;
    let shape = arr.shape().to_vec();
    if shape.len() != 2 || shape[1] != cols {
        return Err(TrajectoryError::shape(
            field,
            format!("(N, {})", cols),
            format!("{:?}", shape),
        ));
    }
    arr.into_dimensionality::<Ix2>().map_err(|_| {
        TrajectoryError::shape(field, format!("(N, {})", cols), format!("{:?}", shape))
    })
}

fn read_points<R: Read + Seek>(
    npz: &mut NpzReader<R>,
    name: &str,
    field: &'static str,
) -> Result<Vec<Vector3<f64>>> {
    let arr = read_matrix(npz, name, field, 3)?;
    Ok(arr
        .rows()
        .into_iter()
        .map(|r| Vector3::new(r[0], r[1], r[2]))
        .collect())
}

fn read_scalars<R: Read + Seek>(
    npz: &mut NpzReader<R>,
    name: &str,
    field: &'static str,
) -> Result<Vec<f64>> {
    let arr = read_dyn(npz, name)?;
    let shape = arr.shape().to_vec();
    let arr = arr
        .into_dimensionality::<Ix1>()
        .map_err(|_| TrajectoryError::shape(field, "(N,)", format!("{:?}", shape)))?;
    Ok(arr.iter().copied().collect())
}

fn read_footprints<R: Read + Seek>(npz: &mut NpzReader<R>, name: &str) -> Result<Vec<Footprint>> {
    let arr = read_dyn(npz, name)?;
    let shape = arr.shape().to_vec();
    // np.zeros((0, 4)) and np.array([]) both mean "no obstacles"
    if shape == [0] {
        return Ok(Vec::new());
    }
    if shape.len() != 2 || shape[1] != 4 {
        return Err(TrajectoryError::shape(
            OBSTACLES_KEY,
            "(M, 4)",
            format!("{:?}", shape),
        ));
    }
    let arr = arr
        .into_dimensionality::<Ix2>()
        .map_err(|_| TrajectoryError::shape(OBSTACLES_KEY, "(M, 4)", format!("{:?}", shape)))?;
    Ok(arr
        .rows()
        .into_iter()
        .map(|r| Footprint::from_row([r[0], r[1], r[2], r[3]]))
        .collect())
}

fn points_array(points: &[Vector3<f64>]) -> Array2<f64> {
    Array2::from_shape_fn((points.len(), 3), |(i, j)| points[i][j])
}

fn footprints_array(footprints: &[Footprint]) -> Array2<f64> {
    Array2::from_shape_fn((footprints.len(), 4), |(i, j)| footprints[i].to_row()[j])
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array1;
    use std::io::Cursor;
    use std::path::PathBuf;

    fn temp_bundle() -> PathBuf {
        std::env::temp_dir().join(format!("flightreplay-{}.npz", uuid::Uuid::new_v4()))
    }

    fn sample_store() -> TrajectoryStore {
        let traj = vec![
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(1.0, 0.5, 1.2),
            Vector3::new(2.0, 1.0, 1.1),
        ];
        let vel = vec![
            Vector3::new(1.0, 0.5, 0.2),
            Vector3::new(1.0, 0.5, -0.1),
            Vector3::new(0.0, 0.0, 0.0),
        ];
        let goal = vec![
            Vector3::new(3.0, 1.0, 1.0),
            Vector3::new(3.0, 1.5, 1.0),
            Vector3::new(3.0, 2.0, 1.0),
        ];
        TrajectoryStore::builder(traj, vel, vec![0.0, 0.1, 0.25])
            .goal_traj(goal)
            .obstacles(vec![
                Footprint::new(0.5, 1.0, -1.0, -0.5),
                Footprint::new(1.5, 2.5, 1.5, 2.0),
            ])
            .build()
            .unwrap()
    }

    /// Writes a bundle holding only the required keys.
    fn write_required_only(path: &Path, timesteps: Array1<f64>) {
        let file = File::create(path).unwrap();
        let mut npz = NpzWriter::new(file);
        let points =
            Array2::from_shape_vec((3, 3), vec![0., 0., 0., 1., 0., 0., 2., 0., 5.]).unwrap();
        npz.add_array("trajectory.npy", &points).unwrap();
        npz.add_array("velocity.npy", &points).unwrap();
        npz.add_array("timesteps.npy", &timesteps).unwrap();
        npz.finish().unwrap();
    }

    #[test]
    fn test_save_load_roundtrip() {
        let path = temp_bundle();
        let store = sample_store();

        save(&store, &path).unwrap();
        let loaded = load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, store);
    }

    #[test]
    fn test_save_overwrites_existing_bundle() {
        let path = temp_bundle();
        std::fs::write(&path, b"not a zip").unwrap();

        save(&sample_store(), &path).unwrap();
        let loaded = load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.sample_count(), 3);
    }

    #[test]
    fn test_writes_numpy_member_names() {
        let bytes = write_bundle(&sample_store(), Cursor::new(Vec::new()))
            .unwrap()
            .into_inner();
        let mut npz = NpzReader::new(Cursor::new(bytes)).unwrap();
        let mut names = npz.names().unwrap();
        names.sort();

        assert_eq!(
            names,
            vec![
                "goal_traj.npy",
                "obstacles.npy",
                "timesteps.npy",
                "trajectory.npy",
                "velocity.npy",
            ]
        );
    }

    #[test]
    fn test_missing_goal_defaults_to_final_position() {
        let path = temp_bundle();
        write_required_only(&path, Array1::from(vec![0.0, 1.0, 2.0]));

        let store = load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let last = store.trajectory()[2];
        assert_eq!(last, Vector3::new(2.0, 0.0, 5.0));
        assert!(store.goal_traj().iter().all(|g| *g == last));
        assert!(store.obstacles().is_empty());
    }

    #[test]
    fn test_missing_required_field() {
        let mut npz = NpzWriter::new(Cursor::new(Vec::new()));
        let points = Array2::<f64>::zeros((2, 3));
        npz.add_array("trajectory.npy", &points).unwrap();
        npz.add_array("timesteps.npy", &Array1::from(vec![0.0, 1.0])).unwrap();
        let bytes = npz.finish().unwrap().into_inner();

        let err = read_bundle(Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, TrajectoryError::MissingRequiredField("velocity")));
    }

    #[test]
    fn test_missing_trajectory_and_timesteps() {
        let points = Array2::<f64>::zeros((2, 3));
        let times = Array1::from(vec![0.0, 1.0]);

        let mut npz = NpzWriter::new(Cursor::new(Vec::new()));
        npz.add_array("velocity.npy", &points).unwrap();
        npz.add_array("timesteps.npy", &times).unwrap();
        let bytes = npz.finish().unwrap().into_inner();
        let err = read_bundle(Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, TrajectoryError::MissingRequiredField("trajectory")));

        let mut npz = NpzWriter::new(Cursor::new(Vec::new()));
        npz.add_array("trajectory.npy", &points).unwrap();
        npz.add_array("velocity.npy", &points).unwrap();
        let bytes = npz.finish().unwrap().into_inner();
        let err = read_bundle(Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, TrajectoryError::MissingRequiredField("timesteps")));
    }

    fn bundle_with_obstacles(obstacles: ArrayD<f64>) -> Vec<u8> {
        let mut npz = NpzWriter::new(Cursor::new(Vec::new()));
        npz.add_array("trajectory.npy", &Array2::<f64>::zeros((2, 3))).unwrap();
        npz.add_array("velocity.npy", &Array2::<f64>::zeros((2, 3))).unwrap();
        npz.add_array("timesteps.npy", &Array1::from(vec![0.0, 1.0])).unwrap();
        npz.add_array("obstacles.npy", &obstacles).unwrap();
        npz.finish().unwrap().into_inner()
    }

    #[test]
    fn test_empty_obstacles_accepted() {
        for shape in [vec![0usize], vec![0, 4]] {
            let bytes = bundle_with_obstacles(ArrayD::zeros(shape));
            let store = read_bundle(Cursor::new(bytes)).unwrap();
            assert!(store.obstacles().is_empty());
        }
    }

    #[test]
    fn test_empty_obstacles_with_wrong_shape_rejected() {
        for shape in [vec![0usize, 3], vec![5, 0], vec![0, 0]] {
            let bytes = bundle_with_obstacles(ArrayD::zeros(shape));
            let err = read_bundle(Cursor::new(bytes)).unwrap_err();
            assert!(matches!(
                err,
                TrajectoryError::ShapeMismatch { field: "obstacles", .. }
            ));
        }
    }

    #[test]
    fn test_length_disagreement_is_shape_mismatch() {
        let path = temp_bundle();
        write_required_only(&path, Array1::from(vec![0.0, 1.0]));

        let err = load(&path).unwrap_err();
        std::fs::remove_file(&path).ok();

        assert!(matches!(
            err,
            TrajectoryError::ShapeMismatch { field: "timesteps", .. }
        ));
    }

    #[test]
    fn test_wrong_column_count_is_shape_mismatch() {
        let mut npz = NpzWriter::new(Cursor::new(Vec::new()));
        npz.add_array("trajectory", &Array2::<f64>::zeros((2, 2))).unwrap();
        npz.add_array("velocity", &Array2::<f64>::zeros((2, 3))).unwrap();
        npz.add_array("timesteps", &Array1::from(vec![0.0, 1.0])).unwrap();
        let bytes = npz.finish().unwrap().into_inner();

        let err = read_bundle(Cursor::new(bytes)).unwrap_err();
        assert!(matches!(
            err,
            TrajectoryError::ShapeMismatch { field: "trajectory", .. }
        ));
    }

    #[test]
    fn test_reads_bare_keys_and_float32() {
        let mut npz = NpzWriter::new(Cursor::new(Vec::new()));
        let points = Array2::<f32>::from_shape_vec((2, 3), vec![0., 0., 0., 1., 2., 3.]).unwrap();
        npz.add_array("trajectory", &points).unwrap();
        npz.add_array("velocity", &points).unwrap();
        npz.add_array("timesteps", &Array1::<f32>::from(vec![0.0, 0.5])).unwrap();
        npz.add_array("obstacles", &Array2::<f64>::zeros((0, 4))).unwrap();
        let bytes = npz.finish().unwrap().into_inner();

        let store = read_bundle(Cursor::new(bytes)).unwrap();
        assert_eq!(store.trajectory()[1], Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(store.timesteps(), &[0.0, 0.5]);
        assert!(store.obstacles().is_empty());
    }
}
