//! Shared ownership of the raw bytes of a file.

use std::fmt::{Debug, Formatter};
use std::ops::Range;
use std::sync::Arc;

/// A shared container for the bytes of a PDF file.
///
/// Cloning is cheap. Every object that refers to a byte range (most importantly
/// streams) holds one of these, so the bytes stay alive as long as the object does.
#[derive(Clone)]
pub struct PdfData {
    inner: Arc<dyn AsRef<[u8]> + Send + Sync>,
}

impl PdfData {
    /// Return the subslice for the given range, if it is in bounds.
    pub fn slice(&self, range: Range<usize>) -> Option<&[u8]> {
        self.as_ref().get(range)
    }

    /// Return the number of bytes.
    pub fn len(&self) -> usize {
        self.as_ref().len()
    }

    /// Whether the data is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Debug for PdfData {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "PdfData {{ len: {} }}", self.len())
    }
}

impl AsRef<[u8]> for PdfData {
    fn as_ref(&self) -> &[u8] {
        (*self.inner).as_ref()
    }
}

impl<T: AsRef<[u8]> + Send + Sync + 'static> From<Arc<T>> for PdfData {
    fn from(data: Arc<T>) -> Self {
        Self { inner: data }
    }
}

impl From<Vec<u8>> for PdfData {
    fn from(data: Vec<u8>) -> Self {
        Self {
            inner: Arc::new(data),
        }
    }
}

impl From<&[u8]> for PdfData {
    fn from(data: &[u8]) -> Self {
        data.to_vec().into()
    }
}

impl<const N: usize> From<&[u8; N]> for PdfData {
    fn from(data: &[u8; N]) -> Self {
        data.to_vec().into()
    }
}
