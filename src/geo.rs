use crate::directory::Directory;
use crate::tag;
use crate::value::Rational;

/// WGS-84 position in decimal degrees
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoLocation {
    /// `None` unless both coordinates are finite and in range
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        valid.then_some(GeoLocation { latitude, longitude })
    }

    /// Read the position from a GPS directory.
    ///
    /// All four of latitude, latitude ref, longitude and longitude ref must
    /// be present and well formed.
    pub fn from_gps(gps: &Directory) -> Option<Self> {
        let latitude = to_degrees(
            gps.get(tag::gps::LATITUDE)?.as_rationals()?,
            gps.get_str(tag::gps::LATITUDE_REF)?,
            ('N', 'S'),
        )?;
        let longitude = to_degrees(
            gps.get(tag::gps::LONGITUDE)?.as_rationals()?,
            gps.get_str(tag::gps::LONGITUDE_REF)?,
            ('E', 'W'),
        )?;
        GeoLocation::new(latitude, longitude)
    }

    /// WKT point, longitude first
    pub fn to_wkt(&self) -> String {
        format!("POINT({} {})", self.longitude, self.latitude)
    }
}

/// `deg + min/60 + sec/3600`, negated for the southern/western hemisphere
fn to_degrees(dms: &[Rational], reference: &str, (positive, negative): (char, char)) -> Option<f64> {
    let [deg, min, sec] = dms else {
        return None;
    };
    let value = deg.to_f64()? + min.to_f64()? / 60.0 + sec.to_f64()? / 3600.0;

    let hemisphere = reference.trim().chars().next()?.to_ascii_uppercase();
    if hemisphere == positive {
        Some(value)
    } else if hemisphere == negative {
        Some(-value)
    } else {
        None
    }
}
