/// The settled value of a [`Future`](crate::Future): either a success payload
/// or a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome<T, E> {
    Success(T),
    Failure(E),
}

impl<T, E> Outcome<T, E> {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// Converts into the success payload, discarding a failure.
    pub fn success(self) -> Option<T> {
        match self {
            Self::Success(value) => Some(value),
            Self::Failure(_) => None,
        }
    }

    /// Converts into the failure, discarding a success payload.
    pub fn failure(self) -> Option<E> {
        match self {
            Self::Success(_) => None,
            Self::Failure(err) => Some(err),
        }
    }

    pub fn as_ref(&self) -> Outcome<&T, &E> {
        match self {
            Self::Success(value) => Outcome::Success(value),
            Self::Failure(err) => Outcome::Failure(err),
        }
    }

    /// Transforms a success payload; failures pass through untouched.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U, E> {
        match self {
            Self::Success(value) => Outcome::Success(f(value)),
            Self::Failure(err) => Outcome::Failure(err),
        }
    }

    /// Transforms a failure; successes pass through untouched.
    pub fn map_failure<E2, F: FnOnce(E) -> E2>(self, f: F) -> Outcome<T, E2> {
        match self {
            Self::Success(value) => Outcome::Success(value),
            Self::Failure(err) => Outcome::Failure(f(err)),
        }
    }

    /// Applies a fallible transform to a success payload. An `Err` from the
    /// transform becomes the failure of the result.
    pub fn and_then<U, F: FnOnce(T) -> Result<U, E>>(self, f: F) -> Outcome<U, E> {
        match self {
            Self::Success(value) => f(value).into(),
            Self::Failure(err) => Outcome::Failure(err),
        }
    }

    /// Gives a failure the chance to turn into a success.
    pub fn or_else<F: FnOnce(E) -> Result<T, E>>(self, f: F) -> Outcome<T, E> {
        match self {
            Self::Success(value) => Outcome::Success(value),
            Self::Failure(err) => f(err).into(),
        }
    }

    pub fn into_result(self) -> Result<T, E> {
        self.into()
    }

    /// Short label used in log records.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Success(_) => "success",
            Self::Failure(_) => "failure",
        }
    }
}

impl<T, E> From<Result<T, E>> for Outcome<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(err) => Self::Failure(err),
        }
    }
}

impl<T, E> From<Outcome<T, E>> for Result<T, E> {
    fn from(outcome: Outcome<T, E>) -> Self {
        match outcome {
            Outcome::Success(value) => Ok(value),
            Outcome::Failure(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Outcome;

    #[test]
    fn test_failure_short_circuits_map() {
        let outcome: Outcome<i32, &str> = Outcome::Failure("boom");
        let mapped = outcome.map(|_| -> i32 { panic!("transform must not run") });
        assert_eq!(mapped, Outcome::Failure("boom"));
    }

    #[test]
    fn test_and_then_captures_err() {
        let outcome: Outcome<i32, String> = Outcome::Success(3);
        let checked = outcome.and_then(|v| if v > 2 { Err(format!("{v} too big")) } else { Ok(v) });
        assert_eq!(checked.failure().as_deref(), Some("3 too big"));
    }

    #[test]
    fn test_or_else_recovers() {
        let outcome: Outcome<i32, &str> = Outcome::Failure("nope");
        assert_eq!(outcome.or_else(|_| Ok(42)), Outcome::Success(42));
    }

    #[test]
    fn test_result_conversions() {
        let outcome: Outcome<u8, ()> = Ok(7).into();
        assert!(outcome.is_success());
        assert_eq!(outcome.kind(), "success");
        assert_eq!(outcome.into_result(), Ok(7));
    }
}
