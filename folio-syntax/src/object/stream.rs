//! Streams.

use crate::data::PdfData;
use crate::error::FilterError;
use crate::filter::{self, DecodeLimits, Filter};
use crate::object::dict::keys::{DECODE_PARMS, DP, F, FILTER};
use crate::object::{Dict, Name, Object, Resolve};
use std::fmt::{Debug, Formatter};
use std::ops::Range;

/// How the extent of the stream data was determined.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LengthStatus {
    /// The declared `/Length` matched the position of the `endstream` keyword.
    Exact,
    /// The `/Length` was absent, could not be resolved or did not match, so the data
    /// was delimited by searching for `endstream`.
    Recovered {
        /// The declared length, if one could be read.
        declared: Option<u64>,
    },
}

/// A stream: a dictionary together with a range of raw, still encoded bytes.
#[derive(Clone)]
pub struct Stream {
    dict: Dict,
    data: PdfData,
    range: Range<usize>,
    length: LengthStatus,
}

impl Stream {
    /// Create a new stream whose data is the given range of `data`.
    pub fn new(dict: Dict, data: PdfData, range: Range<usize>, length: LengthStatus) -> Self {
        Self {
            dict,
            data,
            range,
            length,
        }
    }

    /// Return the dictionary of the stream.
    pub fn dict(&self) -> &Dict {
        &self.dict
    }

    /// Return the raw, encoded data of the stream.
    pub fn raw_data(&self) -> &[u8] {
        self.data.slice(self.range.clone()).unwrap_or_default()
    }

    /// Return the byte range of the raw data within its buffer.
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// Return how the length of the stream was determined.
    pub fn length_status(&self) -> LengthStatus {
        self.length
    }

    /// Whether the data lives in an external file (`/F`), which is never read.
    pub fn is_external(&self) -> bool {
        self.dict.contains_key(F)
    }

    /// Return the names of all filters of the stream, in application order.
    pub fn filter_names(&self, resolver: &dyn Resolve) -> Vec<Name> {
        let filter = resolver.resolve(self.dict.get(FILTER).unwrap_or(Object::NULL));

        match filter.as_ref() {
            Object::Name(n) => vec![n.clone()],
            Object::Array(a) => a
                .iter()
                .filter_map(|o| resolver.resolve(o).as_name().cloned())
                .collect(),
            _ => vec![],
        }
    }

    /// Return the decode parameters for each filter. Missing parameters are `None`.
    fn decode_params(&self, resolver: &dyn Resolve, count: usize) -> Vec<Option<Dict>> {
        let params = self
            .dict
            .get(DECODE_PARMS)
            .or_else(|| self.dict.get(DP))
            .unwrap_or(Object::NULL);
        let params = resolver.resolve(params);

        let mut result = match params.as_ref() {
            Object::Dict(d) => vec![Some(d.clone())],
            Object::Array(a) => a
                .iter()
                .map(|o| resolver.resolve(o).as_dict().cloned())
                .collect(),
            _ => vec![],
        };

        result.resize(count, None);
        result
    }

    /// Decode the data of the stream by applying all of its filters.
    pub fn decoded(
        &self,
        resolver: &dyn Resolve,
        limits: &DecodeLimits,
    ) -> Result<Vec<u8>, FilterError> {
        let raw = self
            .data
            .slice(self.range.clone())
            .ok_or(FilterError::OutOfBounds)?;

        let names = self.filter_names(resolver);
        let params = self.decode_params(resolver, names.len());

        let mut filters = Vec::with_capacity(names.len());
        for name in &names {
            filters.push(Filter::from_name(name)?);
        }

        let mut data = raw.to_vec();

        for (filter, params) in filters.into_iter().zip(params) {
            data = filter::apply(filter, &data, params.as_ref(), limits)?;
        }

        Ok(data)
    }
}

impl PartialEq for Stream {
    fn eq(&self, other: &Self) -> bool {
        self.dict == other.dict && self.raw_data() == other.raw_data()
    }
}

impl Debug for Stream {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stream")
            .field("dict", &self.dict)
            .field("range", &self.range)
            .field("length", &self.length)
            .finish()
    }
}
