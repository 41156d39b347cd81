//! DTI_QA m-code generation.
//!
//! DTI_QA runs inside MATLAB, so instead of a shell command this produces a
//! script body for `matlab -r`. The script runs the pipeline, converts the
//! `.mat` outputs under `{basedir}/extra` to CSV, and exits with status 1 if
//! anything threw.

use crate::error::{Result, SeamError};
use std::path::Path;

/// Boxplot outputs converted from `.mat` to `.csv` with `boxplotsmat_to_csv`.
const BOXPLOTS: &[&str] = &["BoxplotsBias", "BoxplotsFA", "BoxplotsFAsigma", "BoxplotsMD"];

/// Generate m-code running DTI_QA on `images`.
///
/// A single image uses `DTI_QA_Pipeline`; several images use
/// `DTI_QA_Pipeline_Multi` with every image passed in order.
pub fn dtiqa_mcode(
    images: &[String],
    basedir: &Path,
    dtiqa_path: &Path,
    n_b0: u32,
) -> Result<String> {
    let pipeline = match images {
        [] => {
            return Err(SeamError::invalid(
                "dti_qa",
                "at least one DTI image is required",
            ))
        }
        [image] => format!(
            "DTI_QA_Pipeline('{image}', '{}', '{}', {n_b0});",
            basedir.display(),
            dtiqa_path.display()
        ),
        many => {
            let image_string = many
                .iter()
                .map(|im| format!("'{im}'"))
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "DTI_QA_Pipeline_Multi('{}', '{}', {n_b0}, [], {image_string});",
                dtiqa_path.display(),
                basedir.display()
            )
        }
    };

    let extra = basedir.join("extra");
    let file = |name: &str| extra.join(name).display().to_string();

    let mut body = vec![
        pipeline,
        format!("load {}", file("Registration_motion.mat")),
        format!("load {}", file("Outliers.mat")),
        format!("csvwrite('{}', rotation);", file("Rotation.csv")),
        format!("csvwrite('{}', translation);", file("Translation.csv")),
        format!("csvwrite('{}', outs);", file("Outliers.csv")),
    ];
    body.extend(BOXPLOTS.iter().map(|stem| {
        format!(
            "boxplotsmat_to_csv('{}', '{}');",
            file(&format!("{stem}.mat")),
            file(&format!("{stem}.csv"))
        )
    }));

    let mut lines = vec![
        format!("addpath(genpath('{}'))", dtiqa_path.display()),
        "ec = 0;".to_string(),
        "try".to_string(),
    ];
    lines.extend(body.into_iter().map(|line| format!("    {line}")));
    lines.extend(
        [
            "catch exception",
            "    disp(exception.message)",
            "    ec = 1;",
            "end",
            "disp(['Exiting with status ' num2str(ec)]);",
            "exit(ec);",
        ]
        .iter()
        .map(|s| s.to_string()),
    );

    let mut mcode = lines.join("\n");
    mcode.push('\n');
    Ok(mcode)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TAIL: &str = "    load /path/to/basedir/extra/Registration_motion.mat
    load /path/to/basedir/extra/Outliers.mat
    csvwrite('/path/to/basedir/extra/Rotation.csv', rotation);
    csvwrite('/path/to/basedir/extra/Translation.csv', translation);
    csvwrite('/path/to/basedir/extra/Outliers.csv', outs);
    boxplotsmat_to_csv('/path/to/basedir/extra/BoxplotsBias.mat', '/path/to/basedir/extra/BoxplotsBias.csv');
    boxplotsmat_to_csv('/path/to/basedir/extra/BoxplotsFA.mat', '/path/to/basedir/extra/BoxplotsFA.csv');
    boxplotsmat_to_csv('/path/to/basedir/extra/BoxplotsFAsigma.mat', '/path/to/basedir/extra/BoxplotsFAsigma.csv');
    boxplotsmat_to_csv('/path/to/basedir/extra/BoxplotsMD.mat', '/path/to/basedir/extra/BoxplotsMD.csv');
catch exception
    disp(exception.message)
    ec = 1;
end
disp(['Exiting with status ' num2str(ec)]);
exit(ec);
";

    fn run(images: &[&str]) -> Result<String> {
        let images: Vec<String> = images.iter().map(|s| s.to_string()).collect();
        dtiqa_mcode(
            &images,
            Path::new("/path/to/basedir"),
            Path::new("/path/to/dti_qa"),
            6,
        )
    }

    #[test]
    fn single_image() {
        let expected = format!(
            "addpath(genpath('/path/to/dti_qa'))\nec = 0;\ntry\n    \
             DTI_QA_Pipeline('/path/to/dti.nii', '/path/to/basedir', '/path/to/dti_qa', 6);\n{TAIL}"
        );
        assert_eq!(run(&["/path/to/dti.nii"]).unwrap(), expected);
    }

    #[test]
    fn multiple_images() {
        let expected = format!(
            "addpath(genpath('/path/to/dti_qa'))\nec = 0;\ntry\n    \
             DTI_QA_Pipeline_Multi('/path/to/dti_qa', '/path/to/basedir', 6, [], \
             '/path/to/first.nii', '/path/to/second.nii');\n{TAIL}"
        );
        assert_eq!(
            run(&["/path/to/first.nii", "/path/to/second.nii"]).unwrap(),
            expected
        );
    }

    #[test]
    fn single_image_uses_the_given_paths() {
        let images = vec!["/data/s1/dwi.nii".to_string()];
        let mcode = dtiqa_mcode(&images, Path::new("/qa/s1"), Path::new("/opt/dtiqa"), 1).unwrap();
        assert!(mcode.contains("DTI_QA_Pipeline('/data/s1/dwi.nii', '/qa/s1', '/opt/dtiqa', 1);"));
        assert!(mcode.contains("load /qa/s1/extra/Outliers.mat"));
    }

    #[test]
    fn no_images_is_rejected() {
        assert!(matches!(
            run(&[]),
            Err(SeamError::InvalidArgument { tool: "dti_qa", .. })
        ));
    }
}
