/// A WebAssembly proposal that changes what the decoder accepts.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Feature {
    SignExtension,
    SaturatingFloatToInt,
    MultiValue,
}

impl Feature {
    pub fn as_str(&self) -> &'static str {
        use self::Feature::*;
        match *self {
            SignExtension => "sign-extension operators",
            SaturatingFloatToInt => "saturating float-to-int conversions",
            MultiValue => "multi-value block types",
        }
    }
}

/// The set of enabled proposals. `Default` is the MVP.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Features {
    pub sign_extension: bool,
    pub saturating_float_to_int: bool,
    pub multi_value: bool,
}

impl Features {
    pub fn mvp() -> Self {
        Features {
            sign_extension: false,
            saturating_float_to_int: false,
            multi_value: false,
        }
    }

    pub fn all() -> Self {
        Features {
            sign_extension: true,
            saturating_float_to_int: true,
            multi_value: true,
        }
    }

    pub fn is_enabled(&self, feature: Feature) -> bool {
        use self::Feature::*;
        match feature {
            SignExtension => self.sign_extension,
            SaturatingFloatToInt => self.saturating_float_to_int,
            MultiValue => self.multi_value,
        }
    }

    pub fn enable(&mut self, feature: Feature) -> &mut Self {
        self.set(feature, true)
    }

    pub fn disable(&mut self, feature: Feature) -> &mut Self {
        self.set(feature, false)
    }

    fn set(&mut self, feature: Feature, value: bool) -> &mut Self {
        use self::Feature::*;
        match feature {
            SignExtension => self.sign_extension = value,
            SaturatingFloatToInt => self.saturating_float_to_int = value,
            MultiValue => self.multi_value = value,
        }
        self
    }
}

impl Default for Features {
    fn default() -> Self {
        Features::mvp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_features() {
        let f = Features::default();
        assert_eq!(f, Features::mvp());
        assert!(!f.is_enabled(Feature::SignExtension));

        let mut f = Features::mvp();
        f.enable(Feature::MultiValue).enable(Feature::SignExtension);
        assert!(f.multi_value && f.sign_extension);
        f.disable(Feature::MultiValue);
        assert!(!f.is_enabled(Feature::MultiValue));

        assert_eq!(Features::all(), Features {
            sign_extension: true,
            saturating_float_to_int: true,
            multi_value: true,
        });
    }
}
