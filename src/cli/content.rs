//! Static text shown by the dashboard sections

pub const TITLE: &str = "Machine Learning to Create Custom Predictions for Loan Defaults";

pub const OVERVIEW: &str = "\
Build a loan-default model from a menu of preprocessing, feature-selection,
feature-creation and model choices, then inspect how it fits and how much
profit it would make.

Objective: approve loans that get repaid and decline loans that charge off.
Every approved loan that is repaid earns the return on assets (ROA); every
approved loan that charges off loses the haircut. Declined loans earn
nothing. Models are compared on this profit over cross-validation folds.

Process: 20% of the loans are held out (stratified on the charge-off label).
The chosen pipeline is fit on the remaining 80%, train diagnostics are
shown, and k-fold cross-validation on all loans reports the mean and spread
of the profit score. Every run is added to the leaderboard.";

/// Feature descriptions for the dictionary section
pub const DICTIONARY: &[(&str, &str)] = &[
    (
        "annual_inc",
        "The self-reported annual income provided by the borrower during registration.",
    ),
    (
        "dti",
        "A ratio calculated using the borrower's total monthly debt payments on the total debt \
         obligations, excluding mortgage and the requested LC loan, divided by the borrower's \
         self-reported monthly income.",
    ),
    (
        "earliest_cr_line",
        "The month the borrower's earliest reported credit line was opened.",
    ),
    (
        "emp_length",
        "Employment length in years. Possible values are between 0 and 10 where 0 means less \
         than one year and 10 means ten or more years.",
    ),
    (
        "fico_range_high",
        "The upper boundary range the borrower's FICO at loan origination belongs to.",
    ),
    (
        "fico_range_low",
        "The lower boundary range the borrower's FICO at loan origination belongs to.",
    ),
    (
        "installment",
        "The monthly payment owed by the borrower if the loan originates.",
    ),
    ("int_rate", "Interest rate on the loan."),
    (
        "loan_amnt",
        "The listed amount of the loan applied for by the borrower.",
    ),
    ("mort_acc", "Number of mortgage accounts."),
];
