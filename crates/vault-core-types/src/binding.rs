use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

/// A value that may be bound exactly once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum Binding<T> {
    #[default]
    Unset,
    Set(T),
}

/// Returned when binding an already bound value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlreadyBound;

impl<T> Binding<T> {
    pub fn is_set(&self) -> bool {
        matches!(self, Binding::Set(_))
    }

    pub fn get(&self) -> Option<&T> {
        match self {
            Binding::Unset => None,
            Binding::Set(value) => Some(value),
        }
    }

    /// Bind the value, failing if one is already bound
    pub fn bind(&mut self, value: T) -> Result<(), AlreadyBound> {
        if self.is_set() {
            return Err(AlreadyBound);
        }
        *self = Binding::Set(value);
        Ok(())
    }
}

impl<T: Copy + Default> Binding<T> {
    /// Bound value, or the type's default while unset
    pub fn get_or_default(&self) -> T {
        self.get().copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_once() {
        let mut binding: Binding<u32> = Binding::default();
        assert!(!binding.is_set());
        assert_eq!(binding.get(), None);
        assert_eq!(binding.get_or_default(), 0);

        assert_eq!(binding.bind(7), Ok(()));
        assert!(binding.is_set());
        assert_eq!(binding.get(), Some(&7));
    }

    #[test]
    fn test_second_bind_fails_and_keeps_value() {
        let mut binding = Binding::Unset;
        binding.bind("first").unwrap();
        assert_eq!(binding.bind("second"), Err(AlreadyBound));
        assert_eq!(binding, Binding::Set("first"));
    }
}
