/// A value that may be absent.
///
/// `Nothing` carries no data, so a chain of [`Maybe::bind`] calls on an
/// absent value stops at the first tag check without running any closure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Maybe<T> {
    Present(T),
    Nothing,
}

impl<T> Maybe<T> {
    /// Applies `f` to a present value and returns its result as is.
    pub fn bind<U, F>(self, f: F) -> Maybe<U>
    where
        F: FnOnce(T) -> Maybe<U>,
    {
        match self {
            Maybe::Present(v) => f(v),
            Maybe::Nothing => Maybe::Nothing,
        }
    }

    /// Applies `f` to a present value and wraps the result.
    pub fn map<U, F>(self, f: F) -> Maybe<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Maybe::Present(v) => Maybe::Present(f(v)),
            Maybe::Nothing => Maybe::Nothing,
        }
    }

    /// Unwraps a present value.
    ///
    /// # Panics
    ///
    /// Panics on `Nothing`. Callers branch first or stay within
    /// [`Maybe::bind`] and [`Maybe::map`].
    pub fn get(self) -> T {
        match self {
            Maybe::Present(v) => v,
            Maybe::Nothing => panic!("called `Maybe::get()` on `Nothing`"),
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Maybe::Present(_))
    }

    pub fn unwrap_or(self, default: T) -> T {
        match self {
            Maybe::Present(v) => v,
            Maybe::Nothing => default,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Maybe::Present(v) => Some(v),
            Maybe::Nothing => None,
        }
    }
}

impl<T> From<Option<T>> for Maybe<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Maybe::Present(v),
            None => Maybe::Nothing,
        }
    }
}
