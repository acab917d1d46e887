use cutout::MaskError;

pub fn report_error(err: &MaskError) {
    match err {
        MaskError::InvalidSettings(_) => {
            eprintln!("{err}");
            eprintln!();
            eprintln!("Tolerance and smoothness are percentages between 0 and 100.");
        }
        MaskError::Json(_) => {
            eprintln!("{err}");
            eprintln!();
            eprintln!("The settings file must be a JSON object, for example:");
            eprintln!(
                r#"  {{ "targetColor": {{ "r": 0, "g": 255, "b": 0 }}, "tolerance": 12, "blurRadius": 2 }}"#
            );
        }
        _ => {
            eprintln!("{err}");
        }
    }
}
