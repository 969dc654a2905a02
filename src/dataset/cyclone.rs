// Cyclone tracks - best-track observations from a CSV table
//
// Expected headers: lat, lon, wind. Empty cells read as missing. Rows with a
// missing or non-finite value, a fill value (lat >= 99, lon >= 999) or a
// non-positive wind speed are dropped.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::error::{log_data_error, DataError};
use crate::signal::{Matrix, Signal};
use crate::windowing::{AboveThreshold, LabelTimeline};

const LAT_FILL: f32 = 99.0;
const LON_FILL: f32 = 999.0;

#[derive(Debug, Deserialize)]
struct RawObservation {
    lat: Option<f32>,
    lon: Option<f32>,
    wind: Option<f32>,
}

/// One valid track observation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub lat: f32,
    pub lon: f32,
    pub wind: f32,
}

impl RawObservation {
    fn validate(self) -> Option<Observation> {
        let (lat, lon, wind) = (self.lat?, self.lon?, self.wind?);
        let finite = lat.is_finite() && lon.is_finite() && wind.is_finite();
        (finite && lat < LAT_FILL && lon < LON_FILL && wind > 0.0)
            .then_some(Observation { lat, lon, wind })
    }
}

/// Valid observations in file order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrackSet {
    observations: Vec<Observation>,
    dropped: usize,
}

impl TrackSet {
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Rows rejected by the validity filter
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// `(obs, 2)` time-major matrix of (lat, lon)
    pub fn features(&self) -> Result<Signal, DataError> {
        let data = self
            .observations
            .iter()
            .flat_map(|o| [o.lat, o.lon])
            .collect();
        Ok(Signal::TimeMajor(Matrix::new(self.observations.len(), 2, data)?))
    }

    pub fn winds(&self) -> Vec<f32> {
        self.observations.iter().map(|o| o.wind).collect()
    }

    /// Positive where the wind speed strictly exceeds `threshold`
    pub fn labels(&self, threshold: f32) -> LabelTimeline {
        let policy = AboveThreshold::new(self.winds(), threshold);
        LabelTimeline::from_policy(&policy, self.len())
    }
}

pub fn read_tracks<P: AsRef<Path>>(path: P) -> Result<TrackSet, DataError> {
    let file = File::open(&path).map_err(|err| DataError::io(&path, err))?;
    let tracks = read_tracks_from(file).map_err(|err| {
        log_data_error(&err, &format!("read_tracks({})", path.as_ref().display()));
        err
    })?;
    log::info!(
        "[Tracks] Read {} track observations from {:?} ({} dropped)",
        tracks.len(),
        path.as_ref(),
        tracks.dropped()
    );
    Ok(tracks)
}

pub fn read_tracks_from<R: Read>(reader: R) -> Result<TrackSet, DataError> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut tracks = TrackSet::default();
    for record in csv_reader.deserialize::<RawObservation>() {
        match record?.validate() {
            Some(observation) => tracks.observations.push(observation),
            None => tracks.dropped += 1,
        }
    }
    Ok(tracks)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "lat,lon,wind\n\
        10.0,120.0,35\n\
        12.5,121.0,55\n\
        99.9,121.5,60\n\
        13.0,999.9,60\n\
        13.5,122.0,0\n\
        14.0,122.5,\n\
        14.5,123.0,NaN\n\
        15.0,123.5,80\n";

    #[test]
    fn test_invalid_rows_dropped() {
        let tracks = read_tracks_from(TABLE.as_bytes()).unwrap();
        assert_eq!(tracks.len(), 3);
        assert_eq!(tracks.dropped(), 5);
        assert_eq!(tracks.winds(), vec![35.0, 55.0, 80.0]);
    }

    #[test]
    fn test_features_are_time_major() {
        let tracks = read_tracks_from(TABLE.as_bytes()).unwrap();
        let Signal::TimeMajor(m) = tracks.features().unwrap() else {
            panic!("Expected time-major features");
        };
        assert_eq!(m.shape(), (3, 2));
        assert_eq!(m.row(1).unwrap(), &[12.5, 121.0]);
    }

    #[test]
    fn test_wind_labels() {
        let tracks = read_tracks_from(TABLE.as_bytes()).unwrap();
        assert_eq!(tracks.labels(50.0).as_slice(), &[false, true, true]);
        // strict comparison
        assert_eq!(tracks.labels(55.0).as_slice(), &[false, false, true]);
    }

    #[test]
    fn test_bad_table_is_track_error() {
        let err = read_tracks_from("lat,lon,wind\n1.0,abc,3\n".as_bytes()).unwrap_err();
        assert!(matches!(err, DataError::Tracks { .. }));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            read_tracks("/no/such/tracks.csv"),
            Err(DataError::Io { .. })
        ));
    }
}
