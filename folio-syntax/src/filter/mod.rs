//! Decoding stream data.

use crate::error::FilterError;
use crate::object::Dict;
use crate::object::dict::keys::NAME;

mod ascii_85;
mod ascii_hex;
mod flate;
mod lzw;
mod predictor;
mod run_length;

/// Limits applied while decoding a stream.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DecodeLimits {
    /// The maximum number of bytes a single filter stage may produce.
    pub max_output_len: usize,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_output_len: 256 * 1024 * 1024,
        }
    }
}

impl DecodeLimits {
    fn check(&self, len: usize) -> Result<(), FilterError> {
        if len > self.max_output_len {
            Err(FilterError::LimitExceeded {
                limit: self.max_output_len,
            })
        } else {
            Ok(())
        }
    }
}

/// A PDF filter.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Filter {
    /// `ASCIIHexDecode`.
    AsciiHexDecode,
    /// `ASCII85Decode`.
    Ascii85Decode,
    /// `LZWDecode`.
    LzwDecode,
    /// `FlateDecode`.
    FlateDecode,
    /// `RunLengthDecode`.
    RunLengthDecode,
    /// `DCTDecode`. The JPEG data is passed through unchanged.
    DctDecode,
    /// `JPXDecode`. The JPEG 2000 data is passed through unchanged.
    JpxDecode,
    /// `Crypt`. Only the identity crypt filter is supported.
    Crypt,
}

impl Filter {
    /// Look up a filter by name, accepting the abbreviations allowed in inline images.
    pub fn from_name(name: &[u8]) -> Result<Self, FilterError> {
        match name {
            b"ASCIIHexDecode" | b"AHx" => Ok(Self::AsciiHexDecode),
            b"ASCII85Decode" | b"A85" => Ok(Self::Ascii85Decode),
            b"LZWDecode" | b"LZW" => Ok(Self::LzwDecode),
            b"FlateDecode" | b"Fl" => Ok(Self::FlateDecode),
            b"RunLengthDecode" | b"RL" => Ok(Self::RunLengthDecode),
            b"DCTDecode" | b"DCT" => Ok(Self::DctDecode),
            b"JPXDecode" => Ok(Self::JpxDecode),
            b"Crypt" => Ok(Self::Crypt),
            other => {
                let name = String::from_utf8_lossy(other).into_owned();
                lwarn!("unsupported filter /{}", name);

                Err(FilterError::UnsupportedFilter(name))
            }
        }
    }

    /// The full name of the filter.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AsciiHexDecode => "ASCIIHexDecode",
            Self::Ascii85Decode => "ASCII85Decode",
            Self::LzwDecode => "LZWDecode",
            Self::FlateDecode => "FlateDecode",
            Self::RunLengthDecode => "RunLengthDecode",
            Self::DctDecode => "DCTDecode",
            Self::JpxDecode => "JPXDecode",
            Self::Crypt => "Crypt",
        }
    }
}

/// Apply a single filter with its decode parameters.
pub fn apply(
    filter: Filter,
    data: &[u8],
    params: Option<&Dict>,
    limits: &DecodeLimits,
) -> Result<Vec<u8>, FilterError> {
    let malformed = || FilterError::Malformed {
        filter: filter.name(),
    };

    let decoded = match filter {
        Filter::AsciiHexDecode => ascii_hex::decode(data).ok_or_else(malformed)?,
        Filter::Ascii85Decode => ascii_85::decode(data).ok_or_else(malformed)?,
        Filter::RunLengthDecode => run_length::decode(data, limits)?,
        Filter::FlateDecode => {
            let params = predictor::PredictorParams::from_params(params);
            let decoded = flate::decode(data, limits)?;
            predictor::apply(decoded, &params, limits)?
        }
        Filter::LzwDecode => {
            let params = predictor::PredictorParams::from_params(params);
            let decoded = lzw::decode(data, params.early_change, limits).ok_or_else(malformed)?;
            predictor::apply(decoded, &params, limits)?
        }
        Filter::DctDecode | Filter::JpxDecode => data.to_vec(),
        Filter::Crypt => {
            let name = params.and_then(|p| p.get_name(NAME));

            match name {
                None => data.to_vec(),
                Some(n) if n.as_bytes() == b"Identity" => data.to_vec(),
                Some(n) => return Err(FilterError::UnsupportedFilter(format!("Crypt/{n}"))),
            }
        }
    };

    limits.check(decoded.len())?;

    Ok(decoded)
}
