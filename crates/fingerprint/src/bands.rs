//! LSH banding: MinHash minima → sparse one-hot-per-band vector.

use xxhash_rust::xxh64::xxh64;

/// Hash each band of `band_size` minima to a bucket in its own slice of a
/// `signature_size` vector and set that cell to `1.0`.
///
/// The band's bytes are the little-endian encoding of its `u64` minima.
pub fn band_vector(minima: &[u64], band_size: usize, signature_size: usize) -> Vec<f32> {
    let mut vector = vec![0.0f32; signature_size];
    let num_bands = minima.len() / band_size;
    if num_bands == 0 {
        return vector;
    }
    let bits_per_band = signature_size / num_bands;

    let mut bytes = Vec::with_capacity(band_size * 8);
    for (band_index, band) in minima.chunks_exact(band_size).enumerate() {
        bytes.clear();
        for value in band {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        let bucket = (xxh64(&bytes, 0) % bits_per_band as u64) as usize;
        vector[band_index * bits_per_band + bucket] = 1.0;
    }
    vector
}

/// Scale to unit length; an all-zero vector is left untouched.
pub fn l2_normalize_in_place(vector: &mut [f32]) {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for v in vector.iter_mut() {
            *v /= norm;
        }
    }
}
