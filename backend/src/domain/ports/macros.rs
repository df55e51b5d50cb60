//! Helper macro for declaring domain port error enums.
//!
//! Each variant gets a snake-case constructor that accepts `impl Into<T>`
//! for its fields, so adapters write `OrderRepositoryError::query(msg)`
//! instead of spelling out struct literals.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_impl $variant () () $( $field : $ty, )*);
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) ) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor_impl
            $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($inits)* $field: $field.into(),)
            $($rest)*
        );
    };
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    //! Constructor generation coverage.
    define_port_error! {
        pub enum ExampleStoreError {
            Offline => "store offline",
            Rejected { message: String } => "rejected: {message}",
            Throttled { retry_after_ms: u64 } => "throttled for {retry_after_ms}ms",
            Missing { key: String, partition: String } => "{key} missing in {partition}",
        }
    }

    #[test]
    fn unit_variants_get_nullary_constructors() {
        assert_eq!(ExampleStoreError::offline().to_string(), "store offline");
    }

    #[test]
    fn string_fields_accept_str() {
        let err = ExampleStoreError::rejected("bad document");
        assert_eq!(err.to_string(), "rejected: bad document");
    }

    #[test]
    fn non_string_fields_keep_their_type() {
        let err = ExampleStoreError::throttled(250_u64);
        assert_eq!(err, ExampleStoreError::Throttled { retry_after_ms: 250 });
    }

    #[test]
    fn multi_field_variants_preserve_order() {
        let err = ExampleStoreError::missing("7", "store-1");
        assert_eq!(err.to_string(), "7 missing in store-1");
    }
}
