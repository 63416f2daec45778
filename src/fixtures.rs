#[cfg(test)]
pub mod test {
    use confique::Config;
    use serde::{Deserialize, Serialize};
    use toml::value::Datetime;

    #[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq)]
    pub struct Employee {
        /// Employee name.
        #[config(default = "defName")]
        pub name: String,

        /// Employee address.
        #[config(default = "defAddr")]
        pub addr: String,

        /// Years of service.
        #[config(default = 1)]
        pub years: u32,

        /// Whether the employee is retired.
        #[config(default = false)]
        pub retired: bool,

        /// Weekly hours per project.
        #[config(default = [1, 2])]
        pub num_list: Vec<i64>,

        /// Badge number, if one was issued.
        pub badge: Option<String>,

        /// Employer details.
        #[config(nested)]
        pub employer: Company,
    }

    #[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq)]
    pub struct Company {
        /// Company name.
        #[config(default = "defCom")]
        pub name: String,
    }

    impl Employee {
        /// Same values as the `#[config(default)]` attributes, built by hand
        /// the way callers pass explicit defaults.
        pub fn defaults() -> Self {
            Self {
                name: "defName".into(),
                addr: "defAddr".into(),
                years: 1,
                retired: false,
                num_list: vec![1, 2],
                badge: None,
                employer: Company {
                    name: "defCom".into(),
                },
            }
        }
    }

    #[test]
    fn employee_defaults_match_attributes() {
        let loaded = Employee::builder().load().unwrap();
        assert_eq!(loaded, Employee::defaults());
    }

    // -- Fixtures for action dispatch ------------------------------------------

    #[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq)]
    pub struct ZipShow {
        /// Archive to inspect.
        #[config(default = "defaultShowZipf")]
        pub zipf: String,

        /// File inside the archive.
        #[config(default = "defaultShowFname")]
        pub fname: String,
    }

    #[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq)]
    pub struct ZipArchive {
        /// Folder to archive.
        #[config(default = "defaultArchiveFolder")]
        pub folder: String,

        /// Archive to create.
        #[config(default = "defaultArchiveZipf")]
        pub zipf: String,
    }

    impl ZipShow {
        pub fn defaults() -> Self {
            Self {
                zipf: "defaultShowZipf".into(),
                fname: "defaultShowFname".into(),
            }
        }
    }

    impl ZipArchive {
        pub fn defaults() -> Self {
            Self {
                folder: "defaultArchiveFolder".into(),
                zipf: "defaultArchiveZipf".into(),
            }
        }
    }

    // -- Fixture for datetime and float flags ----------------------------------

    #[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq)]
    pub struct Shift {
        /// When the shift starts.
        pub start: Datetime,

        /// Pay multiplier.
        #[config(default = 1.0)]
        pub rate: f64,
    }

    impl Shift {
        pub fn defaults() -> Self {
            Self {
                start: "1999-01-02T03:04:05Z".parse().unwrap(),
                rate: 1.0,
            }
        }
    }
}
