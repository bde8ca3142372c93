pub(crate) trait OptionLog {
    fn warn_none(self, f: &str) -> Self;
}

impl<T> OptionLog for Option<T> {
    fn warn_none(self, _f: &str) -> Self {
        self.or_else(|| {
            lwarn!("{}", _f);

            None
        })
    }
}
