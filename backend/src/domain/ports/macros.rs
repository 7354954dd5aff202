//! Helper macro generating port error enums with snake_case constructors.

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
    //! Constructor generation for port error enums.
    define_port_error! {
        pub enum StockPortError {
            Backend { message: String } => "backend: {message}",
            Shortfall { product_id: i64, available: u32 } => "shortfall on {product_id}: {available} left",
            Closed => "closed",
        }
    }

    #[test]
    fn constructors_accept_str_for_string_fields() {
        let err = StockPortError::backend("timeout");
        assert_eq!(err.to_string(), "backend: timeout");
    }

    #[test]
    fn constructors_preserve_numeric_fields() {
        let err = StockPortError::shortfall(4_i64, 2_u32);
        assert_eq!(err.to_string(), "shortfall on 4: 2 left");
    }

    #[test]
    fn unit_variants_get_nullary_constructors() {
        assert_eq!(StockPortError::closed(), StockPortError::Closed);
    }
}
