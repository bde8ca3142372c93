use crate::error::FilterError;
use crate::filter::DecodeLimits;
use crate::object::Dict;
use crate::object::dict::keys::{BITS_PER_COMPONENT, COLORS, COLUMNS, EARLY_CHANGE, PREDICTOR};

const MALFORMED: FilterError = FilterError::Malformed { filter: "predictor" };

pub(crate) struct PredictorParams {
    pub(crate) predictor: i64,
    pub(crate) colors: usize,
    pub(crate) bits_per_component: usize,
    pub(crate) columns: usize,
    pub(crate) early_change: bool,
}

impl Default for PredictorParams {
    fn default() -> Self {
        Self {
            predictor: 1,
            colors: 1,
            bits_per_component: 8,
            columns: 1,
            early_change: true,
        }
    }
}

impl PredictorParams {
    pub(crate) fn from_params(dict: Option<&Dict>) -> Self {
        let Some(dict) = dict else {
            return Self::default();
        };

        let positive = |key: &[u8], default: usize| {
            dict.get_int(key)
                .and_then(|v| usize::try_from(v).ok())
                .filter(|v| *v > 0)
                .unwrap_or(default)
        };

        Self {
            predictor: dict.get_int(PREDICTOR).unwrap_or(1),
            colors: positive(COLORS, 1),
            bits_per_component: positive(BITS_PER_COMPONENT, 8),
            columns: positive(COLUMNS, 1),
            early_change: dict.get_int(EARLY_CHANGE).is_none_or(|e| e != 0),
        }
    }

    fn bits_per_pixel(&self) -> Option<usize> {
        self.bits_per_component.checked_mul(self.colors)
    }

    fn bytes_per_pixel(&self) -> Option<usize> {
        Some(self.bits_per_pixel()?.div_ceil(8).max(1))
    }

    fn row_length(&self) -> Option<usize> {
        Some(self.bits_per_pixel()?.checked_mul(self.columns)?.div_ceil(8))
    }
}

/// Undo a TIFF or PNG predictor.
///
/// The row length comes from `/Columns` and is checked against the limits before
/// anything is sized by it.
pub(crate) fn apply(
    data: Vec<u8>,
    params: &PredictorParams,
    limits: &DecodeLimits,
) -> Result<Vec<u8>, FilterError> {
    match params.predictor {
        2 => tiff(data, params, limits),
        10..=15 => png(&data, params, limits),
        // 1 means no prediction, and unknown values are treated the same way.
        _ => Ok(data),
    }
}

fn row_length(params: &PredictorParams, limits: &DecodeLimits) -> Result<usize, FilterError> {
    let row_len = params.row_length().ok_or(MALFORMED)?;
    limits.check(row_len)?;

    Ok(row_len)
}

fn tiff(
    mut data: Vec<u8>,
    params: &PredictorParams,
    limits: &DecodeLimits,
) -> Result<Vec<u8>, FilterError> {
    let row_len = row_length(params, limits)?;
    let colors = params.colors;

    match params.bits_per_component {
        8 => {
            for row in data.chunks_mut(row_len) {
                for i in colors..row.len() {
                    row[i] = row[i].wrapping_add(row[i - colors]);
                }
            }
        }
        16 => {
            for row in data.chunks_mut(row_len) {
                let stride = colors * 2;

                for i in (stride..row.len().saturating_sub(1)).step_by(2) {
                    let prev = u16::from_be_bytes([row[i - stride], row[i - stride + 1]]);
                    let cur = u16::from_be_bytes([row[i], row[i + 1]]);
                    row[i..i + 2].copy_from_slice(&cur.wrapping_add(prev).to_be_bytes());
                }
            }
        }
        other => {
            ldebug!("TIFF predictor with {} bits per component is not supported", other);
        }
    }

    Ok(data)
}

fn png(
    data: &[u8],
    params: &PredictorParams,
    limits: &DecodeLimits,
) -> Result<Vec<u8>, FilterError> {
    let row_len = row_length(params, limits)?;
    let bpp = params.bytes_per_pixel().ok_or(MALFORMED)?;

    if row_len == 0 {
        return Err(MALFORMED);
    }

    // Rows longer than the data only ever hold the single truncated row.
    let buf_len = row_len.min(data.len());
    let mut out = Vec::with_capacity(data.len());
    let mut prev_row = vec![0_u8; buf_len];

    for chunk in data.chunks(row_len + 1) {
        let (&kind, encoded) = chunk.split_first().ok_or(MALFORMED)?;
        let mut row = vec![0_u8; buf_len];
        // A truncated last row is padded with zeroes.
        row[..encoded.len()].copy_from_slice(encoded);

        for i in 0..buf_len {
            let left = if i >= bpp { row[i - bpp] } else { 0 };
            let up = prev_row[i];
            let up_left = if i >= bpp { prev_row[i - bpp] } else { 0 };

            let predicted = match kind {
                0 => 0,
                1 => left,
                2 => up,
                3 => ((u16::from(left) + u16::from(up)) / 2) as u8,
                4 => paeth(left, up, up_left),
                _ => return Err(MALFORMED),
            };

            row[i] = row[i].wrapping_add(predicted);
        }

        out.extend_from_slice(&row[..encoded.len()]);
        prev_row = row;
    }

    Ok(out)
}

fn paeth(a: u8, b: u8, c: u8) -> u8 {
    let p = i16::from(a) + i16::from(b) - i16::from(c);
    let pa = (p - i16::from(a)).abs();
    let pb = (p - i16::from(b)).abs();
    let pc = (p - i16::from(c)).abs();

    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}

#[cfg(test)]
mod tests {
    use super::{PredictorParams, apply};
    use crate::error::FilterError;
    use crate::filter::DecodeLimits;

    fn params(predictor: i64, colors: usize, columns: usize) -> PredictorParams {
        PredictorParams {
            predictor,
            colors,
            bits_per_component: 8,
            columns,
            early_change: true,
        }
    }

    fn run(data: Vec<u8>, params: &PredictorParams) -> Result<Vec<u8>, FilterError> {
        apply(data, params, &DecodeLimits::default())
    }

    #[test]
    fn png_up() {
        let data = vec![2, 1, 2, 3, 2, 1, 1, 1];
        assert_eq!(
            run(data, &params(12, 1, 3)).unwrap(),
            vec![1, 2, 3, 2, 3, 4]
        );
    }

    #[test]
    fn png_mixed_rows() {
        // Row one uses Sub, row two uses Average, row three uses Paeth.
        let data = vec![1, 5, 1, 3, 2, 4, 4, 4, 3];
        assert_eq!(
            run(data, &params(15, 1, 2)).unwrap(),
            vec![5, 6, 4, 9, 8, 12]
        );
    }

    #[test]
    fn png_invalid_row_type() {
        assert!(run(vec![9, 1, 2], &params(10, 1, 2)).is_err());
    }

    #[test]
    fn tiff_rgb() {
        let data = vec![10, 20, 30, 1, 1, 1];
        assert_eq!(
            run(data, &params(2, 3, 2)).unwrap(),
            vec![10, 20, 30, 11, 21, 31]
        );
    }

    #[test]
    fn no_prediction() {
        assert_eq!(run(vec![1, 2], &params(1, 1, 1)).unwrap(), vec![1, 2]);
    }

    #[test]
    fn huge_columns_are_rejected() {
        let limits = DecodeLimits {
            max_output_len: 1 << 20,
        };

        for predictor in [2, 12] {
            let result = apply(vec![2, 0, 0, 0], &params(predictor, 1, 1 << 60), &limits);
            assert_eq!(
                result,
                Err(FilterError::LimitExceeded {
                    limit: 1 << 20
                })
            );
        }
    }

    #[test]
    fn row_longer_than_data() {
        // A single truncated row is decoded without sizing anything by `/Columns`.
        assert_eq!(run(vec![1, 1, 1, 1], &params(11, 1, 1 << 16)).unwrap(), vec![1, 2, 3]);
    }
}
