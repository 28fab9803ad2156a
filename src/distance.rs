// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::Point;

/// Mean radius of Earth, in meters.
/// Source: https://en.wikipedia.org/wiki/Earth_radius#Arithmetic_mean_radius
const EARTH_RADIUS: f64 = 6_371_000.0;

/// Calculates the great-circle distance between two lat-lon positions on Earth
/// using the [haversine formula](https://en.wikipedia.org/wiki/Haversine_formula).
/// Returns the result in meters.
///
/// Graph weights produced by the OSM builder depend on this function
/// bit-for-bit; the half-angle `2·atan2(√a, √(1−a))` form must not be
/// swapped for the asin variant.
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let sin_d_lat_half = (d_lat * 0.5).sin();
    let sin_d_lon_half = (d_lon * 0.5).sin();

    let a = sin_d_lat_half * sin_d_lat_half
        + lat1.to_radians().cos() * lat2.to_radians().cos() * sin_d_lon_half * sin_d_lon_half;

    EARTH_RADIUS * 2.0 * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Calculates the straight-line distance between two [Points](Point),
/// in whatever planar frame the points are expressed in.
pub fn euclidean_distance(a: &Point, b: &Point) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    let dz = a.z - b.z;
    (dx * dx + dy * dy + dz * dz).sqrt()
}
